use glam::Vec2;

/// Identifies one rendered line or choice. Button clicks carry it back so a
/// click on an already-replaced prompt can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromptId(pub u32);

/// Horizontal facing of the character sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// +1.0 when walking right, -1.0 when walking left.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    /// Horizontal mirror applied to the sprite (`scaleX(..)`).
    pub fn scale_x(self) -> f32 {
        self.sign()
    }
}

/// Measured layout of the room view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Width/height of the room view's bounding rect, in CSS pixels.
    pub size: Vec2,
    /// Current width of the character's positioning container.
    pub container_width: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, container_width: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            container_width,
        }
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }
}

/// Fixed on-screen controls every room page carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Help,
    Left,
    Right,
    Volume,
}

/// Something the user can click.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClickTarget {
    Character,
    Object(String),
    Control(Control),
    /// Darkened area around an open close-up.
    Backdrop,
    /// Hotspot by its index in the open close-up's object list.
    Hotspot(usize),
    DialogueButton { prompt: PromptId, index: usize },
}

/// Where the character's container sits and which way the sprite faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub left: f32,
    pub bottom: f32,
    pub facing: Facing,
}

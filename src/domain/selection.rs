//! Selection types shared by the region editor and its hosts

/// Part of the selection the pointer is over, or being dragged.
///
/// Values are distinct bits so callers can test against the diagonal and
/// axis masks below.
#[repr(u16)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseLocation {
    #[default]
    None = 0,
    Inside = 1,
    Outside = 2,
    TopLeft = 4,
    Top = 8,
    TopRight = 16,
    Right = 32,
    BottomRight = 64,
    Bottom = 128,
    BottomLeft = 256,
    Left = 512,
}

impl MouseLocation {
    pub const TOP_LEFT_OR_BOTTOM_RIGHT: u16 =
        MouseLocation::TopLeft as u16 | MouseLocation::BottomRight as u16;
    pub const TOP_RIGHT_OR_BOTTOM_LEFT: u16 =
        MouseLocation::TopRight as u16 | MouseLocation::BottomLeft as u16;
    pub const TOP_OR_BOTTOM: u16 = MouseLocation::Top as u16 | MouseLocation::Bottom as u16;
    pub const RIGHT_OR_LEFT: u16 = MouseLocation::Right as u16 | MouseLocation::Left as u16;

    pub fn bits(self) -> u16 {
        self as u16
    }

    /// Whether this location is any of the bits in `mask`
    pub fn is_in(self, mask: u16) -> bool {
        self.bits() & mask != 0
    }

    /// One of the four corner handles
    pub fn is_corner(self) -> bool {
        self.is_in(Self::TOP_LEFT_OR_BOTTOM_RIGHT | Self::TOP_RIGHT_OR_BOTTOM_LEFT)
    }

    /// One of the four edge handles
    pub fn is_edge(self) -> bool {
        self.is_in(Self::TOP_OR_BOTTOM | Self::RIGHT_OR_LEFT)
    }

    /// Pointer shape a host should show over this location
    pub fn cursor(self) -> CursorShape {
        if self.is_in(Self::TOP_LEFT_OR_BOTTOM_RIGHT) {
            CursorShape::ResizeDiagonalForward
        } else if self.is_in(Self::TOP_RIGHT_OR_BOTTOM_LEFT) {
            CursorShape::ResizeDiagonalBack
        } else if self.is_in(Self::TOP_OR_BOTTOM) {
            CursorShape::ResizeVertical
        } else if self.is_in(Self::RIGHT_OR_LEFT) {
            CursorShape::ResizeHorizontal
        } else if self == MouseLocation::Inside {
            CursorShape::OpenHand
        } else {
            CursorShape::Crosshair
        }
    }
}

impl From<u16> for MouseLocation {
    fn from(bits: u16) -> Self {
        match bits {
            1 => MouseLocation::Inside,
            2 => MouseLocation::Outside,
            4 => MouseLocation::TopLeft,
            8 => MouseLocation::Top,
            16 => MouseLocation::TopRight,
            32 => MouseLocation::Right,
            64 => MouseLocation::BottomRight,
            128 => MouseLocation::Bottom,
            256 => MouseLocation::BottomLeft,
            512 => MouseLocation::Left,
            _ => MouseLocation::None,
        }
    }
}

/// Pointer shapes the editor asks its host to display
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    #[default]
    Crosshair,
    OpenHand,
    ClosedHand,
    ResizeDiagonalForward,
    ResizeDiagonalBack,
    ResizeVertical,
    ResizeHorizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Kind of device driving the pointer; touch gets larger handles
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputModality {
    #[default]
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Enter,
    Return,
    Escape,
    Other,
}

impl Key {
    pub fn is_arrow(self) -> bool {
        matches!(self, Key::Left | Key::Right | Key::Up | Key::Down)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        alt: false,
        ctrl: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }
}

use hud_model::Point;

const SWIPE_MIN_DX: f32 = 250.0;
const SWIPE_MIN_DY: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Tap,
    SwipeUp,
    SwipeDown,
    SwipeHorizontal,
    /// Long enough to be a swipe but with no dominant axis. Consumed without action.
    SwipeDiagonal,
}

impl Gesture {
    pub fn is_swipe(self) -> bool {
        !matches!(self, Gesture::Tap)
    }
}

/// Classifies a press/release pair by its displacement (release minus press).
pub fn classify(dx: f32, dy: f32) -> Gesture {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ax <= SWIPE_MIN_DX && ay <= SWIPE_MIN_DY {
        return Gesture::Tap;
    }
    if ax < ay {
        if dy < 0.0 { Gesture::SwipeUp } else { Gesture::SwipeDown }
    } else if ax > ay {
        Gesture::SwipeHorizontal
    } else {
        Gesture::SwipeDiagonal
    }
}

/// Remembers where the pointer went down.
#[derive(Debug, Default, Clone)]
pub struct PointerTracker {
    pressed_at: Option<Point>,
}

impl PointerTracker {
    pub fn press(&mut self, p: Point) {
        self.pressed_at = Some(p);
    }

    /// `None` for a release without a matching press.
    pub fn release(&mut self, p: Point) -> Option<Gesture> {
        let start = self.pressed_at.take()?;
        Some(classify(p.x - start.x, p.y - start.y))
    }
}

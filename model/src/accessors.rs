use std::sync::Arc;

use crate::{Color, PathPoint};

/// Maps one entity (and its position in the data list) to some attribute.
pub type Accessor<T, R> = Arc<dyn Fn(&T, usize) -> R + Send + Sync>;

/// How to pull paths, radii, and colors out of arbitrary caller data. Anything not set falls back
/// to a default: radius 1, opaque black, and no static position.
pub struct Accessors<T> {
    pub get_path: Accessor<T, Vec<PathPoint>>,
    pub get_position: Option<Accessor<T, [f64; 3]>>,
    pub get_radius: Accessor<T, f64>,
    pub get_color: Accessor<T, Color>,
}

impl<T> Accessors<T> {
    pub fn new<F: Fn(&T, usize) -> Vec<PathPoint> + Send + Sync + 'static>(get_path: F) -> Self {
        Self {
            get_path: Arc::new(get_path),
            get_position: None,
            get_radius: Arc::new(|_, _| 1.0),
            get_color: Arc::new(|_, _| Color::BLACK),
        }
    }

    pub fn position<F: Fn(&T, usize) -> [f64; 3] + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.get_position = Some(Arc::new(f));
        self
    }

    pub fn radius<F: Fn(&T, usize) -> f64 + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.get_radius = Arc::new(f);
        self
    }

    pub fn color<F: Fn(&T, usize) -> Color + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.get_color = Arc::new(f);
        self
    }
}

// Derive would demand T: Clone
impl<T> Clone for Accessors<T> {
    fn clone(&self) -> Self {
        Self {
            get_path: self.get_path.clone(),
            get_position: self.get_position.clone(),
            get_radius: self.get_radius.clone(),
            get_color: self.get_color.clone(),
        }
    }
}

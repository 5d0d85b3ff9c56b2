/*
 * Layout parameters for the custom chrome and the shared cell the primary
 * decoration keeps them in. The overlay decoration reads the same cell through
 * its back-reference, so a single `set` reconfigures both windows at once.
 */
use crate::error::{PlatformError, Result as PlatformResult};

use std::sync::{Arc, RwLock};

/// Pixel measurements describing the custom title bar and resize borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationParameters {
    pub title_bar_height: i32,
    /// Width reserved at the right of the title bar for min/max/close buttons.
    pub control_box_width: i32,
    /// Width reserved at the left of the title bar for the window icon.
    pub icon_width: i32,
    pub extra_left_reserved_width: i32,
    pub extra_right_reserved_width: i32,
    /// Frame overhang Windows applies to maximized windows.
    pub maximized_frame_thickness: i32,
    pub resize_border_thickness: i32,
    pub frame_border_thickness: i32,
}

impl Default for DecorationParameters {
    fn default() -> Self {
        Self {
            title_bar_height: 27,
            control_box_width: 150,
            icon_width: 40,
            extra_left_reserved_width: 0,
            extra_right_reserved_width: 0,
            maximized_frame_thickness: 10,
            resize_border_thickness: 4,
            frame_border_thickness: 1,
        }
    }
}

impl DecorationParameters {
    pub fn with_title_bar_height(mut self, value: i32) -> Self {
        self.title_bar_height = value;
        self
    }

    pub fn with_control_box_width(mut self, value: i32) -> Self {
        self.control_box_width = value;
        self
    }

    pub fn with_icon_width(mut self, value: i32) -> Self {
        self.icon_width = value;
        self
    }

    pub fn with_extra_left_reserved_width(mut self, value: i32) -> Self {
        self.extra_left_reserved_width = value;
        self
    }

    pub fn with_extra_right_reserved_width(mut self, value: i32) -> Self {
        self.extra_right_reserved_width = value;
        self
    }

    pub fn with_maximized_frame_thickness(mut self, value: i32) -> Self {
        self.maximized_frame_thickness = value;
        self
    }

    pub fn with_resize_border_thickness(mut self, value: i32) -> Self {
        self.resize_border_thickness = value;
        self
    }

    pub fn with_frame_border_thickness(mut self, value: i32) -> Self {
        self.frame_border_thickness = value;
        self
    }

    /*
     * Rejects negative measurements. All other combinations are accepted,
     * including reserved zones wider than the window, which simply leave no
     * caption area.
     */
    pub fn validate(&self) -> PlatformResult<()> {
        let fields = [
            ("title_bar_height", self.title_bar_height),
            ("control_box_width", self.control_box_width),
            ("icon_width", self.icon_width),
            ("extra_left_reserved_width", self.extra_left_reserved_width),
            ("extra_right_reserved_width", self.extra_right_reserved_width),
            ("maximized_frame_thickness", self.maximized_frame_thickness),
            ("resize_border_thickness", self.resize_border_thickness),
            ("frame_border_thickness", self.frame_border_thickness),
        ];
        let negative: Vec<String> = fields
            .iter()
            .filter(|(_, value)| *value < 0)
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        if negative.is_empty() {
            Ok(())
        } else {
            Err(PlatformError::InvalidParameters(format!(
                "negative values not allowed: {}",
                negative.join(", ")
            )))
        }
    }
}

/*
 * Parameter cell owned by the primary decoration. Writers always replace the
 * whole value and readers always take a full copy, so a hit test can never see
 * half of an update.
 */
#[derive(Debug, Clone, Default)]
pub struct SharedParameters {
    inner: Arc<RwLock<DecorationParameters>>,
}

impl SharedParameters {
    pub fn new(params: DecorationParameters) -> Self {
        Self {
            inner: Arc::new(RwLock::new(params)),
        }
    }

    pub fn get(&self) -> DecorationParameters {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set(&self, params: DecorationParameters) -> PlatformResult<()> {
        params.validate()?;
        match self.inner.write() {
            Ok(mut guard) => *guard = params,
            Err(poisoned) => *poisoned.into_inner() = params,
        }
        log::debug!("SharedParameters: replaced with {params:?}");
        Ok(())
    }

    /// Applies `f` to the current snapshot and stores the result as a whole.
    pub fn update<F>(&self, f: F) -> PlatformResult<DecorationParameters>
    where
        F: FnOnce(DecorationParameters) -> DecorationParameters,
    {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = f(*guard);
        next.validate()?;
        *guard = next;
        Ok(next)
    }
}

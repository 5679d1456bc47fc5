//! Typed properties for the uniform style accessor API.
//!
//! Every object, regardless of widget type, can be configured through
//! [`Ui::set_style`](crate::Ui::set_style) and queried through
//! [`Ui::get_style`](crate::Ui::get_style). Geometry keys (position,
//! size, alignment, layout) are serviced by the engine itself because
//! they cascade through the tree; the rest are forwarded to the widget's
//! own style accessors.

use embedded_graphics::pixelcolor::Rgb565;

use crate::obj::{Align, Layout};

/// A style property together with its value.
#[derive(Debug, Clone, PartialEq)]
pub enum Style {
    /// Horizontal position, relative to the parent's origin.
    PosX(i16),
    /// Vertical position, relative to the parent's origin.
    PosY(i16),
    Width(i16),
    Height(i16),
    /// Place the object relative to its parent.
    Align(Align),
    /// Corner radius; clamped to half the smaller object dimension.
    Radius(i16),
    /// Layout applied to the object's children.
    Layout(Layout),
    /// Margin used by the layout pass.
    Margin(i16),
    Hidden(bool),
    /// Primary color. Widgets decide what "primary" means for them.
    Color(Rgb565),
    BgColor(Rgb565),
    TextColor(Rgb565),
    Text(heapless::String<32>),
    /// On/off state for stateful widgets (checkbox tick, button latch).
    Status(bool),
}

impl Style {
    /// The key naming this property.
    pub fn key(&self) -> StyleKey {
        match self {
            Self::PosX(_) => StyleKey::PosX,
            Self::PosY(_) => StyleKey::PosY,
            Self::Width(_) => StyleKey::Width,
            Self::Height(_) => StyleKey::Height,
            Self::Align(_) => StyleKey::Align,
            Self::Radius(_) => StyleKey::Radius,
            Self::Layout(_) => StyleKey::Layout,
            Self::Margin(_) => StyleKey::Margin,
            Self::Hidden(_) => StyleKey::Hidden,
            Self::Color(_) => StyleKey::Color,
            Self::BgColor(_) => StyleKey::BgColor,
            Self::TextColor(_) => StyleKey::TextColor,
            Self::Text(_) => StyleKey::Text,
            Self::Status(_) => StyleKey::Status,
        }
    }

    /// Convenience constructor for text values; truncates past 32 bytes.
    pub fn text(s: &str) -> Self {
        let mut out = heapless::String::new();
        if out.push_str(s).is_err() {
            for ch in s.chars() {
                if out.push(ch).is_err() {
                    break;
                }
            }
        }
        Self::Text(out)
    }
}

/// Value-less property name, used to query a style.
///
/// [`Ui::get_style`](crate::Ui::get_style) answers with the matching
/// [`Style`] variant, or `None` when the widget does not support the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKey {
    PosX,
    PosY,
    Width,
    Height,
    Align,
    Radius,
    Layout,
    Margin,
    Hidden,
    Color,
    BgColor,
    TextColor,
    Text,
    Status,
}

impl StyleKey {
    /// Keys the engine services itself, without consulting the widget.
    pub(crate) const fn is_geometry(self) -> bool {
        matches!(
            self,
            Self::PosX
                | Self::PosY
                | Self::Width
                | Self::Height
                | Self::Align
                | Self::Layout
                | Self::Margin
                | Self::Hidden
                | Self::Radius
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_key_matches_variant() {
        assert_eq!(Style::PosX(5).key(), StyleKey::PosX);
        assert_eq!(Style::Status(true).key(), StyleKey::Status);
        assert_eq!(Style::text("hi").key(), StyleKey::Text);
    }

    #[test]
    fn test_text_constructor_truncates() {
        let long = "a string well past the thirty-two byte capacity limit";
        let Style::Text(s) = Style::text(long) else {
            panic!("expected text variant");
        };
        assert_eq!(s.len(), 32);
    }

    #[test]
    fn test_geometry_key_partition() {
        assert!(StyleKey::PosX.is_geometry());
        assert!(StyleKey::Align.is_geometry());
        assert!(!StyleKey::Color.is_geometry());
        assert!(!StyleKey::Text.is_geometry());
    }
}

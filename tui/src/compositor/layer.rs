//! A single compositor layer: its own buffer plus placement metadata.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::LayerId;

/// One z-ordered region with its own backing buffer.
pub struct Layer {
    pub id: LayerId,
    /// Position and size within the compositor area.
    pub bounds: Rect,
    pub z_index: i32,
    pub visible: bool,
    /// Opaque layers blit every cell; transparent layers treat blank
    /// cells as holes so lower layers show through.
    pub opaque: bool,
    /// Backing buffer, origin-addressed (0,0 .. bounds.width/height).
    pub buffer: Buffer,
}

impl Layer {
    pub fn new(id: LayerId, bounds: Rect, z_index: i32, opaque: bool) -> Self {
        Self {
            id,
            bounds,
            z_index,
            visible: true,
            opaque,
            buffer: Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height)),
        }
    }
}

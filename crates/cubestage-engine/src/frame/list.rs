use crate::paint::Color;

use super::{DrawCall, FrameCmd};

/// Recorded commands for one frame.
#[derive(Debug, Default, Clone)]
pub struct FrameList {
    items: Vec<FrameCmd>,
}

impl FrameList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded commands. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn push(&mut self, cmd: FrameCmd) {
        self.items.push(cmd);
    }

    /// Returns commands in recording order.
    #[inline]
    pub fn items(&self) -> &[FrameCmd] {
        &self.items
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn draw_calls(&self) -> impl Iterator<Item = &DrawCall> {
        self.items.iter().filter_map(|cmd| match cmd {
            FrameCmd::Draw(call) => Some(call),
            _ => None,
        })
    }

    /// True if a depth-test command precedes the first draw.
    ///
    /// A list without draws trivially satisfies this.
    pub fn depth_test_before_draws(&self) -> bool {
        let mut enabled = false;
        for cmd in &self.items {
            match cmd {
                FrameCmd::EnableDepthTest => enabled = true,
                FrameCmd::Draw(_) if !enabled => return false,
                _ => {}
            }
        }
        true
    }

    /// True once any `EnableDepthTest` has been recorded.
    pub fn depth_test_enabled(&self) -> bool {
        self.items.iter().any(|cmd| matches!(cmd, FrameCmd::EnableDepthTest))
    }

    /// Clear color and depth of the frame's leading `Clear`, if any.
    pub fn clear_op(&self) -> Option<(Color, Option<f32>)> {
        self.items.iter().find_map(|cmd| match cmd {
            FrameCmd::Clear { color, depth } => Some((*color, *depth)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ProgramId;

    fn draw(count: u32) -> FrameCmd {
        FrameCmd::Draw(DrawCall::full(ProgramId(0), count))
    }

    #[test]
    fn draw_calls_filters_in_order() {
        let mut list = FrameList::new();
        list.push(FrameCmd::Clear { color: Color::BLACK, depth: None });
        list.push(draw(3));
        list.push(draw(36));

        let counts: Vec<u32> = list.draw_calls().map(|d| d.vertex_count).collect();
        assert_eq!(counts, [3, 36]);
    }

    #[test]
    fn depth_test_must_precede_draws() {
        let mut list = FrameList::new();
        list.push(FrameCmd::Clear { color: Color::BLACK, depth: Some(1.0) });
        list.push(draw(36));
        list.push(FrameCmd::EnableDepthTest);
        assert!(!list.depth_test_before_draws());
        assert!(list.depth_test_enabled());

        list.clear();
        list.push(FrameCmd::EnableDepthTest);
        list.push(draw(36));
        assert!(list.depth_test_before_draws());
    }

    #[test]
    fn clear_op_reports_first_clear() {
        let mut list = FrameList::new();
        assert_eq!(list.clear_op(), None);
        list.push(FrameCmd::Clear { color: Color::RED, depth: Some(1.0) });
        assert_eq!(list.clear_op(), Some((Color::RED, Some(1.0))));
    }

    #[test]
    fn vertex_range_covers_count() {
        let call = DrawCall { program: ProgramId(1), first_vertex: 6, vertex_count: 30 };
        assert_eq!(call.vertices(), 6..36);
    }
}

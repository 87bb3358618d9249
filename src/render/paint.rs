use vello::kurbo::{Affine, RoundedRect};
use vello::peniko::Fill;
use vello::Scene;

use super::RenderCommand;

/// Tile fill opacity.
const TILE_ALPHA: f32 = 0.95;

/// Paint one frame of a render pass: every command sampled at `elapsed_ms` since the
/// pass started, as rounded rectangles. Returns the number of tiles drawn (zero-area
/// tiles are skipped).
///
/// Text is left to the host; label anchors are on [`RenderCommand::label`].
pub fn paint_frame(scene: &mut Scene, commands: &[RenderCommand], elapsed_ms: f32, corner_radius: f32) -> usize {
    scene.reset();

    let mut drawn = 0usize;
    for command in commands {
        let rect = command.rect_at(elapsed_ms);
        if rect.area() <= 0.0 {
            continue;
        }
        let radius = corner_radius
            .min(rect.width() / 2.0)
            .min(rect.height() / 2.0)
            .max(0.0);
        let shape = RoundedRect::new(
            rect.x0 as f64,
            rect.y0 as f64,
            rect.x1 as f64,
            rect.y1 as f64,
            radius as f64,
        );
        scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            command.color.to_peniko(TILE_ALPHA),
            None,
            &shape,
        );
        drawn += 1;
    }

    tracing::trace!("Painted {} of {} tiles at t={:.0}ms", drawn, commands.len(), elapsed_ms);
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::render::RenderEngine;
    use crate::tree::{NormalizedLeaf, Tree};

    #[test]
    fn entering_tiles_are_invisible_at_t0_and_drawn_at_end() {
        let mut engine = RenderEngine::new(EngineConfig::default());
        let tree = Tree::from_leaves([NormalizedLeaf::new("A", 3.0), NormalizedLeaf::new("B", 1.0)]);
        let plan = engine.render(&tree, 400.0, 200.0);

        let mut scene = Scene::new();
        assert_eq!(paint_frame(&mut scene, &plan.commands, 0.0, 6.0), 0);
        assert_eq!(paint_frame(&mut scene, &plan.commands, 10_000.0, 6.0), 2);
    }
}

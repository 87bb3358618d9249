//! End-to-end checks: raw feed → normalizer → layout → reconciliation → commands.

use std::collections::BTreeSet;
use std::time::Instant;

use serde_json::json;
use treemap_flip::config::EngineConfig;
use treemap_flip::data::Dataset;
use treemap_flip::layout::{layout, Rect};
use treemap_flip::normalize::{normalize, normalize_set, EntityKind, RawRecordSet};
use treemap_flip::render::labels::LabelMode;
use treemap_flip::render::reconcile::TilePhase;
use treemap_flip::render::RenderEngine;
use treemap_flip::tree::{NormalizedLeaf, Tree};
use treemap_flip::ui::dashboard::{Dashboard, RenderRequest};

fn tree(values: &[(&str, f64)]) -> Tree {
    Tree::from_leaves(values.iter().map(|(n, v)| NormalizedLeaf::new(n, *v)))
}

#[test]
fn two_leaf_split_on_wide_canvas() {
    let leaves = layout(&tree(&[("A", 3.0), ("B", 1.0)]), 400.0, 200.0, 0.0);
    assert_eq!(leaves[0].rect, Rect::new(0.0, 0.0, 300.0, 200.0));
    assert_eq!(leaves[1].rect, Rect::new(300.0, 0.0, 400.0, 200.0));
    assert_eq!(leaves[0].pct, 0.75);
    assert_eq!(leaves[1].pct, 0.25);
}

#[test]
fn single_object_group_record() {
    let record = json!({ "country_code": "AAA", "job_groups": { "name": "X", "share": 10 } });
    let entity = normalize(&record, 0, EntityKind::Country, 10).unwrap();
    let tree = entity.tree();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.children[0].name, "X");
    assert_eq!(tree.children[0].value, 10.0);
}

#[test]
fn record_without_groups_or_topics_renders_no_data() {
    let entity = normalize(&json!({ "state_code": "WY" }), 0, EntityKind::State, 10).unwrap();
    let leaves = layout(&entity.tree(), 640.0, 480.0, 6.0);
    assert_eq!(leaves.len(), 1);
    assert!(leaves[0].key == "no_data");
    assert_eq!(leaves[0].value, 1.0);
    assert_eq!(leaves[0].pct, 1.0);
    assert_eq!(leaves[0].rect, Rect::new(0.0, 0.0, 640.0, 480.0));
}

#[test]
fn keys_are_stable_under_permutation_and_casing() {
    let a = json!({ "code": "Q", "job_groups": [
        { "name": "Computer and Mathematical", "value": 3 },
        { "name": "Management", "value": 2 },
        { "name": "Legal", "value": 1 }
    ]});
    let b = json!({ "code": "Q", "job_groups": [
        { "name": "legal", "value": 1 },
        { "name": "COMPUTER AND MATHEMATICAL", "value": 3 },
        { "name": "Management", "value": 2 }
    ]});
    let keys = |record: &serde_json::Value| -> BTreeSet<String> {
        normalize(record, 0, EntityKind::Country, 10)
            .unwrap()
            .tree()
            .children
            .iter()
            .map(|l| l.key.to_string())
            .collect()
    };
    assert_eq!(keys(&a), keys(&b));
}

#[test]
fn non_ascii_group_names_keep_their_share() {
    let record = json!({ "code": "JP", "job_groups": [
        { "name": "日本語教育", "value": 60 },
        { "name": "Management", "value": 20 },
        { "name": "Éducation", "value": 20 }
    ]});
    let entity = normalize(&record, 0, EntityKind::Country, 10).unwrap();
    let leaves = layout(&entity.tree(), 400.0, 300.0, 0.0);
    assert_eq!(leaves.len(), 3);

    let pct = |key: &str| leaves.iter().find(|l| l.key == key).map(|l| l.pct);
    assert_eq!(pct("日本語教育"), Some(0.6));
    assert_eq!(pct("management"), Some(0.2));
    assert_eq!(pct("éducation"), Some(0.2));
}

#[test]
fn retained_tile_starts_from_previous_rect() {
    let mut engine = RenderEngine::new(EngineConfig::default());
    let first = engine.render(&tree(&[("A", 3.0), ("B", 1.0)]), 400.0, 200.0);
    let second = engine.render(&tree(&[("A", 1.0), ("B", 1.0), ("C", 2.0)]), 400.0, 200.0);

    let a_before = first.leaves.iter().find(|l| l.key == "a").unwrap().rect;
    let a_now = second.commands.iter().find(|c| c.key == "a").unwrap();
    assert_eq!(a_now.phase, TilePhase::Updating);
    assert_eq!(a_now.from_rect, a_before);

    let c = second.commands.iter().find(|c| c.key == "c").unwrap();
    assert_eq!(c.phase, TilePhase::Entering);
    assert_eq!(c.from_rect, c.to_rect.collapsed_to_center());
}

#[test]
fn exit_shrinks_and_is_forgotten() {
    let mut engine = RenderEngine::new(EngineConfig::default());
    engine.render(&tree(&[("A", 1.0), ("B", 1.0)]), 400.0, 200.0);
    let plan = engine.render(&tree(&[("A", 1.0)]), 400.0, 200.0);

    let b = plan.commands.iter().find(|c| c.key == "b").unwrap();
    assert_eq!(b.phase, TilePhase::Exiting);
    assert_eq!(b.to_rect.area(), 0.0);
    assert_eq!(b.label_mode(), LabelMode::Hidden);
    assert!(!engine.layout_state().contains("b"));
    assert_eq!(plan.commands.last().map(|c| c.key.as_str()), Some("b"));
}

#[test]
fn labels_follow_final_geometry() {
    let mut engine = RenderEngine::new(EngineConfig::default());
    let plan = engine.render(&tree(&[("Big", 90.0), ("Tiny", 1.0)]), 800.0, 400.0);
    let big = plan.commands.iter().find(|c| c.key == "big").unwrap();
    let tiny = plan.commands.iter().find(|c| c.key == "tiny").unwrap();
    assert_eq!(big.label_mode(), LabelMode::NameAndPercent);
    assert_eq!(big.label_text(), "Big\n98.9%");
    assert_eq!(tiny.label_mode(), LabelMode::Hidden);
}

#[test]
fn degenerate_canvas_is_clamped() {
    let leaves = layout(&tree(&[("A", 1.0), ("B", 1.0)]), 0.0, 0.0, 6.0);
    let right = leaves.iter().map(|l| l.rect.x1).fold(0.0, f32::max);
    let bottom = leaves.iter().map(|l| l.rect.y1).fold(0.0, f32::max);
    assert_eq!((right, bottom), (200.0, 200.0));
}

#[test]
fn flat_rows_feed_end_to_end() {
    let raw = RawRecordSet::from_value(json!([
        { "geo_id": "FR", "facet": "collaboration", "variable": "collaboration_count", "cluster_name": "directive", "value": 30 },
        { "geo_id": "FR", "facet": "collaboration", "variable": "collaboration_count", "cluster_name": "learning", "value": 10 },
        { "geo_id": "FR", "facet": "country", "variable": "usage_count", "value": 40 }
    ]));
    let set = normalize_set(&raw, EntityKind::Country, 10);
    let fr = &set.entities[0];
    assert_eq!(fr.title, "France");

    let leaves = layout(&fr.tree(), 400.0, 200.0, 0.0);
    assert_eq!(leaves[0].key, "directive");
    assert_eq!(leaves[0].rect, Rect::new(0.0, 0.0, 300.0, 200.0));
}

#[test]
fn dashboard_session_with_builtin_data() {
    let mut dashboard = Dashboard::new(EngineConfig::default(), Dataset::builtin(10));
    let now = Instant::now();

    let ca = dashboard.handle(RenderRequest::Select("CA".into()), now).unwrap();
    assert_eq!(ca.tiles.len(), 5);
    assert_eq!(ca.topics.len(), 2);
    assert_eq!(ca.topics[0].text.chars().count(), 83);

    let usa = dashboard.handle(RenderRequest::SetMode(EntityKind::Country), now).unwrap();
    assert_eq!(usa.title, "United States");
    let shared = usa.tiles.iter().find(|t| t.key == "computer_and_mathematical").unwrap();
    assert_eq!(shared.phase, TilePhase::Updating);
    assert_eq!(shared.color, ca.tiles.iter().find(|t| t.key == "computer_and_mathematical").unwrap().color);
}

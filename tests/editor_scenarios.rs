// Host-side end-to-end scenarios over the core crate: placing, snapping,
// persisting and the camera helpers working together.

use glam::Vec3;
use miniroom_core::constants::*;
use miniroom_core::*;
use pollster::block_on;
use std::f32::consts::PI;
use std::time::Duration;

#[test]
fn wide_sofa_is_pulled_back_by_its_overshoot() {
    let mut dims = RoomDimensions::default();
    dims.apply(RoomDimensionsPatch {
        width: Some(15.0),
        depth: Some(15.0),
        margin: Some(0.5),
        ..Default::default()
    });
    let sofa = PlacedItem::new("sofa", Footprint::new(2.2, 1.0, 0.9)).at(Vec3::new(8.0, 0.0, 0.0));
    let out = constrain_to_room(&sofa, &dims.boundaries(), 0.0);
    assert!((out.position.x - 5.9).abs() < 1e-4);
}

#[test]
fn camera_turns_twenty_degrees_not_three_forty() {
    let d = shortest_rotation(170f32.to_radians(), (-170f32).to_radians());
    assert!((d - 20f32.to_radians()).abs() < 1e-5);

    let mut rig = OrbitRig::new(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, CameraProfile::default());
    for _ in 0..6 {
        rig.rotate(PI, 0.0);
    }
    let before = rig.azimuth();
    move_camera_to_target(&mut rig, Vec3::new(0.5, 2.0, 5.0), Vec3::ZERO, true);
    assert!((rig.goal_azimuth() - rig.azimuth()).abs() <= PI);
    assert!(rig.azimuth().abs() <= PI + 1e-4, "wound-up {before} was not normalized");
}

#[test]
fn drag_snap_lock_and_persist() {
    let mut ed = EditorState::new();
    ed.set_mode(Mode::Edit);
    ed.add_item(PlacedItem::new("desk", Footprint::new(1.2, 0.6, 0.75))).unwrap();

    let raw = Vec3::new(1.04, 0.0, -0.98);
    let snapped = ed.snap.apply_position(raw);
    ed.update_item("desk", ItemUpdate::position(snapped)).unwrap();
    let pos = ed.item("desk").unwrap().position;
    assert!((pos.x - 1.0).abs() < 1e-5 && (pos.z + 1.0).abs() < 1e-5, "{pos:?}");

    let t0 = instant::Instant::now();
    ed.end_gesture("desk", t0);
    let locked = ed.tick(t0 + Duration::from_millis(AUTO_LOCK_DELAY_MS));
    assert_eq!(locked, vec!["desk".to_string()]);
    assert!(ed.update_item("desk", ItemUpdate::position(Vec3::ZERO)).is_err());

    let store = LayoutStore::new(MemoryStorage::new());
    store.save_current(&ed, 42.0).unwrap();
    let mut reopened = EditorState::new();
    assert!(store.restore_into(&mut reopened));
    let desk = reopened.item("desk").unwrap();
    assert!(desk.locked);
    assert_eq!(desk.snap_settings, Some(LockedSnapSettings::from(&ed.snap)));
}

#[test]
fn catalog_overrides_and_custom_assets() {
    let registry = OverrideRegistry::new(MemoryStorage::new());
    let catalog = vec![
        CatalogItem {
            id: "chair".into(),
            name: "Chair".into(),
            name_ko: "의자".into(),
            category: FurnitureCategory::Living,
            model_path: Some("/models/chair.glb".into()),
            thumbnail_path: None,
            footprint: Footprint::new(0.5, 0.5, 0.9),
            tags: vec![],
        },
        CatalogItem {
            id: "plant".into(),
            name: "Plant".into(),
            name_ko: "화분".into(),
            category: FurnitureCategory::Decorative,
            model_path: None,
            thumbnail_path: None,
            footprint: Footprint::new(0.3, 0.3, 1.1),
            tags: vec![],
        },
    ];
    registry.set(
        "chair",
        FurnitureOverride {
            name: Some("Stool".into()),
            ..Default::default()
        },
    );
    registry.set(
        "plant",
        FurnitureOverride {
            hidden: Some(true),
            ..Default::default()
        },
    );
    let visible = registry.apply_to_items(&catalog);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name_ko, "Stool");

    let assets = AssetOverrides::new(MemoryBlobStore::new());
    let urls = MemoryObjectUrls::new();
    let map = block_on(async {
        assets.set_thumbnail_override("chair", &[0x89, b'P', b'N', b'G']).await.unwrap();
        assets
            .override_urls(&["chair".to_string(), "plant".to_string()], &urls)
            .await
            .unwrap()
    });
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["chair"]);
    let thumb = map["chair"].thumb_url.as_deref().unwrap();
    assert_eq!(urls.mime_of(thumb).as_deref(), Some(THUMB_MIME));
    urls.revoke(thumb);
    assert_eq!(urls.live_count(), 0);
}

#[test]
fn spiral_search_clears_overlap_inside_room() {
    let room = RoomDimensions::default().boundaries();
    let a = PlacedItem::new("a", Footprint::new(1.0, 1.0, 1.0));
    let b = PlacedItem::new("b", Footprint::new(1.0, 1.0, 1.0)).at(Vec3::new(0.2, 0.0, 0.0));
    let all = vec![a, b.clone()];
    let moved = move_to_safe_position(&b, &all);
    assert!(collisions_with_others(&moved, &all, None).is_empty());
    let clamped = constrain_to_room(&moved, &room, FURNITURE_SAFETY_MARGIN);
    assert!(is_in_room(&clamped, &room, FURNITURE_SAFETY_MARGIN));
}

mod common;

use clip_curator::store::{project, PageMove, RangeFields, SegmentSlot, SlotUpdate};
use clip_curator::{DatasetStore, StoreConfig};
use common::{clip_key, record, Fixture};
use serde_json::json;

#[test]
fn test_projection_clamps_index() {
    let fixture = Fixture::with_clips(5);
    let store = DatasetStore::default();
    let (mut session, _) = store.load_and_init(fixture.path()).unwrap();

    let high = project(&mut session, 7, None, RangeFields::none(), 3);
    assert_eq!(high.page, 5);
    assert_eq!(high.audio_name, clip_key(5));
    assert_eq!(session.cursor, 4);

    let low = project(&mut session, -1, None, RangeFields::none(), 3);
    assert_eq!(low.page, 1);
    assert_eq!(low.audio_name, clip_key(1));
    assert_eq!(session.cursor, 0);
}

#[test]
fn test_step_and_jump() {
    let fixture = Fixture::with_clips(5);
    let store = DatasetStore::default();
    let (mut session, view) = store.load_and_init(fixture.path()).unwrap();

    let view = store.paginate(&mut session, view.page, RangeFields::none(), PageMove::Step(1));
    assert_eq!(view.page, 2);
    assert_eq!(view.page_label, "Current Audio: 2/5");

    let view = store.paginate(&mut session, view.page, RangeFields::none(), PageMove::To(4));
    assert_eq!(view.page, 5);

    let view = store.paginate(&mut session, view.page, RangeFields::none(), PageMove::Step(-2));
    assert_eq!(view.page, 3);
    assert_eq!(session.cursor, 2);

    let view = store.paginate(&mut session, view.page, RangeFields::none(), PageMove::Stay);
    assert_eq!(view.page, 3);
}

#[test]
fn test_out_of_bounds_move_stays_put() {
    let fixture = Fixture::with_clips(3);
    let store = DatasetStore::default();
    let (mut session, _) = store.load_and_init(fixture.path()).unwrap();

    let view = store.paginate(&mut session, 3, RangeFields::none(), PageMove::Step(1));
    assert_eq!(view.page, 3, "Past the end stays on the last page");

    let view = store.paginate(&mut session, 1, RangeFields::none(), PageMove::Step(-1));
    assert_eq!(view.page, 1, "Before the start stays on the first page");

    let view = store.paginate(&mut session, 2, RangeFields::none(), PageMove::To(99));
    assert_eq!(view.page, 2);
}

#[test]
fn test_huge_step_stays_put() {
    let fixture = Fixture::with_clips(3);
    let store = DatasetStore::default();
    let (mut session, _) = store.load_and_init(fixture.path()).unwrap();

    let view = store.paginate(&mut session, 2, RangeFields::none(), PageMove::Step(i64::MAX));
    assert_eq!(view.page, 2);

    let view = store.paginate(&mut session, 2, RangeFields::none(), PageMove::Step(i64::MIN));
    assert_eq!(view.page, 2);
    assert_eq!(session.cursor, 1);
}

#[test]
fn test_range_fields_stick_only_while_filled() {
    let fixture = Fixture::with_clips(4);
    let store = DatasetStore::default();
    let (mut session, _) = store.load_and_init(fixture.path()).unwrap();

    let view = store.paginate(&mut session, 1, RangeFields::new("2", ""), PageMove::Step(1));
    assert_eq!(view.range_start.as_deref(), Some("2"));
    assert_eq!(view.range_end.as_deref(), Some(""));
    assert!(session.keep_range_start);
    assert!(!session.keep_range_end);

    // Same bookkeeping when the move is refused.
    let view = store.paginate(&mut session, 4, RangeFields::new("", "9"), PageMove::Step(1));
    assert_eq!(view.page, 4);
    assert_eq!(view.range_start.as_deref(), Some(""));
    assert_eq!(view.range_end.as_deref(), Some("9"));
}

#[test]
fn test_segment_slots_follow_record() {
    let fixture = Fixture::new(&json!({
        "000001_x": record("three parts", &[("a", 0.0, 1.0), ("b", 1.0, 2.5), ("c", 2.5, 4.0)]),
        "000002_y": record("one part", &[("only", 0.0, 2.0)]),
    }));
    let store = DatasetStore::new(StoreConfig {
        segment_slots: 4,
        ..StoreConfig::default()
    });
    let (mut session, view) = store.load_and_init(fixture.path()).unwrap();

    let slots = view.segments.slots().unwrap();
    assert_eq!(slots.len(), 4);
    assert!(slots[..3].iter().all(|s| s.visible));
    assert_eq!(
        slots[1],
        SegmentSlot {
            visible: true,
            text: "b".to_string(),
            start: "1.0".to_string(),
            end: "2.5".to_string(),
        }
    );
    assert_eq!(slots[3], SegmentSlot::hidden());

    let view = store.paginate(&mut session, 1, RangeFields::none(), PageMove::Step(1));
    let slots = view.segments.slots().unwrap();
    assert_eq!(slots.iter().filter(|s| s.visible).count(), 1);
    assert_eq!(slots[0].end, "2.0");
}

#[test]
fn test_slots_truncate_to_capacity() {
    let fixture = Fixture::new(&json!({
        "000001_x": record("many", &[("a", 0.0, 1.0), ("b", 1.0, 2.0), ("c", 2.0, 3.0)]),
    }));
    let store = DatasetStore::new(StoreConfig {
        segment_slots: 2,
        ..StoreConfig::default()
    });

    let (_, view) = store.load_and_init(fixture.path()).unwrap();
    let slots = view.segments.slots().unwrap();
    assert_eq!(slots.len(), 2);
    assert!(slots.iter().all(|s| s.visible));
}

#[test]
fn test_blank_transcript_hides_segments() {
    let fixture = Fixture::new(&json!({
        "000001_x": record("", &[("orphan", 0.0, 1.0)]),
        "000002_y": record("fine", &[]),
    }));
    let store = DatasetStore::default();

    let (_, view) = store.load_and_init(fixture.path()).unwrap();

    assert_eq!(view.message, "There are no segments or text available for this audio.");
    assert_eq!(view.text, "");
    assert_eq!(view.audio_name, "000001_x");
    match view.segments {
        SlotUpdate::Replace(slots) => assert!(slots.iter().all(|s| !s.visible)),
        SlotUpdate::Unchanged => panic!("blank clip should still reset the slots"),
    }
}

#[test]
fn test_refresh_keeps_cursor_and_message() {
    let fixture = Fixture::with_clips(3);
    let store = DatasetStore::default();
    let (mut session, _) = store.load_and_init(fixture.path()).unwrap();
    store.paginate(&mut session, 1, RangeFields::none(), PageMove::To(1));

    let view = store.refresh(&mut session, Some("hello".to_string()));

    assert_eq!(view.page, 2);
    assert_eq!(view.message, "hello");
}

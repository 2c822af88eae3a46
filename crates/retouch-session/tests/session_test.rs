//! Edit session workflows: commits, undo/redo branches, limits.

use retouch_core::{PixelBuffer, Rect};
use retouch_ops::resize::ResizeFilter;
use retouch_ops::{AdjustmentParam, AdjustmentParams};
use retouch_session::{EditSession, EditorConfig, HistoryLimits, SessionError, TransformOp};

fn photo() -> PixelBuffer {
    PixelBuffer::from_fn(20, 12, |x, y| [(x * 12) as u8, (y * 20) as u8, 90, 255]).unwrap()
}

#[test]
fn test_every_commit_is_undoable() {
    let src = photo();
    let mut s = EditSession::new(src.clone());

    s.apply_filter("sepia").unwrap();
    s.apply_preset("dramatic").unwrap();
    s.apply_transform(TransformOp::FlipHorizontal).unwrap();
    s.apply_transform(TransformOp::Resize { width: 10, height: 6, filter: ResizeFilter::Nearest })
        .unwrap();
    s.set_param(AdjustmentParam::Vignette, 50.0);
    assert!(s.commit_adjustments());
    assert_eq!(s.history().len(), 6);
    assert_eq!(s.image().dimensions(), (10, 6));

    for _ in 0..5 {
        s.undo().unwrap();
    }
    assert_eq!(s.image(), &src);
    assert!(matches!(s.undo(), Err(SessionError::NoHistory(_))));

    for _ in 0..5 {
        s.redo().unwrap();
    }
    assert_eq!(s.image().dimensions(), (10, 6));
    assert!(s.redo().is_err());
}

#[test]
fn test_new_commit_drops_redo_branch() {
    let mut s = EditSession::new(photo());
    s.apply_filter("invert").unwrap();
    s.apply_filter("grayscale").unwrap();
    s.undo().unwrap();
    s.apply_transform(TransformOp::RotateCw).unwrap();

    assert!(!s.history().can_redo());
    let descriptions: Vec<String> = s.history_panel().into_iter().map(|i| i.description).collect();
    assert_eq!(
        descriptions,
        vec!["Image Loaded", "Applied invert filter", "Rotated 90°"]
    );
    assert_eq!(s.image().dimensions(), (12, 20));
}

#[test]
fn test_jump_to_panel_entry() {
    let mut s = EditSession::new(photo());
    s.apply_transform(TransformOp::Crop(Rect::new(0, 0, 5, 5))).unwrap();
    s.apply_transform(TransformOp::Scale { factor: 2.0, filter: ResizeFilter::Bilinear })
        .unwrap();

    let panel = s.history_panel();
    assert!(panel[2].active);
    s.jump_to(panel[1].index).unwrap();
    assert_eq!(s.image().dimensions(), (5, 5));
    assert!(s.history_panel()[1].active);
    assert!(s.jump_to(7).is_err());
    assert_eq!(s.image().dimensions(), (5, 5));
}

#[test]
fn test_history_capacity_from_config() {
    let config = EditorConfig {
        history: HistoryLimits::with_capacity(3),
        ..Default::default()
    };
    let mut s = EditSession::with_config(photo(), &config);
    for _ in 0..4 {
        s.apply_filter("invert").unwrap();
    }
    assert_eq!(s.history().len(), 3);
    s.undo().unwrap();
    s.undo().unwrap();
    assert!(s.undo().is_err());
    assert!(!s.history().descriptions().contains(&"Image Loaded"));
}

#[test]
fn test_preview_layers_over_commits() {
    let mut s = EditSession::new(PixelBuffer::filled(4, 4, [100, 100, 100, 255]).unwrap());
    s.set_param(AdjustmentParam::Brightness, 150.0);
    assert_eq!(s.stats().average, [150, 150, 150]);
    assert_eq!(s.histogram().red[150], 16);

    // Filters run on the committed buffer; the live slider stays on top
    s.apply_filter("invert").unwrap();
    assert_eq!(s.image().get(0, 0).unwrap(), [155, 155, 155, 255]);
    assert_eq!(s.preview().get(0, 0).unwrap(), [233, 233, 233, 255]);
    assert_eq!(s.params().brightness, 150.0);

    s.reset();
    assert_eq!(s.image(), s.original());
    assert_eq!(s.params(), &AdjustmentParams::default());
}

#[test]
fn test_noise_seed_is_deterministic() {
    let config = EditorConfig { noise_seed: 7, ..Default::default() };
    let params = AdjustmentParams { noise: 40.0, ..Default::default() };

    let mut a = EditSession::with_config(photo(), &config);
    let mut b = EditSession::with_config(photo(), &config);
    a.set_params(params);
    b.set_params(params);
    assert_eq!(a.preview(), b.preview());
    assert_eq!(a.pipeline().seed(), 7);
}

#[test]
fn test_failed_operations_record_nothing() {
    let mut s = EditSession::new(photo());
    assert!(s.apply_filter("lomo").unwrap_err().is_recoverable());
    assert!(s.apply_preset("lomo").unwrap_err().is_recoverable());
    assert!(s.apply_transform(TransformOp::Crop(Rect::new(0, 0, 0, 3))).is_err());
    assert!(s.apply_transform(TransformOp::Scale { factor: -1.0, filter: ResizeFilter::Nearest }).is_err());
    assert_eq!(s.history().len(), 1);
}

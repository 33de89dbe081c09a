use simscope::{Sample, SampleBuffer, SimscopeError};

/// Samples at t = 0.0, 0.2, ..., 2.0 with channel values derived from t.
fn ramp() -> SampleBuffer {
    let mut buf = SampleBuffer::new(2);
    for i in 0..=10 {
        let t = i as f64 / 5.0;
        buf.push(Sample::new(t, vec![t * 10.0, -t])).unwrap();
    }
    buf
}

#[test]
fn window_keeps_one_leading_sample() {
    let mut buf = ramp();
    buf.update(2.0, 1.0);

    let expected: Vec<f64> = (4..=10).map(|i| i as f64 / 5.0).collect();
    let shown = buf.get_shown_data();
    assert_eq!(shown.times, expected, "0.8 stays as the segment into the window");
    assert_eq!(shown.channels.len(), 2);
    assert_eq!(shown.channels[0].len(), expected.len());
    assert_eq!(buf.first_time(), Some(0.8));
    assert_eq!(buf.window(), Some((1.0, 2.0)));
}

#[test]
fn update_is_idempotent() {
    let mut buf = ramp();
    buf.update(2.0, 1.0);
    let first = buf.get_shown_data();
    let len = buf.len();
    buf.update(2.0, 1.0);
    assert_eq!(buf.len(), len);
    assert_eq!(buf.get_shown_data(), first);
}

#[test]
fn last_data_ignores_window() {
    let mut buf = ramp();
    buf.update(0.6, 0.2);
    assert_eq!(buf.get_last_data(), Some(vec![20.0, -2.0]));
}

#[test]
fn out_of_order_sample_is_rejected_and_buffer_untouched() {
    let mut buf = ramp();
    let before = buf.get_shown_data();
    let err = buf.push(Sample::new(1.0, vec![0.0, 0.0])).unwrap_err();
    assert!(matches!(
        err,
        SimscopeError::OutOfOrderSample { time, tail } if time == 1.0 && tail == 2.0
    ));
    assert!(err.is_recoverable());
    assert_eq!(buf.len(), 11);
    assert_eq!(buf.get_shown_data(), before);
}

#[test]
fn at_end_tracks_the_clock() {
    let buf = ramp();
    assert!(buf.is_at_end(2.0));
    assert!(buf.is_at_end(1.5));
    assert!(!buf.is_at_end(2.5));
    assert!(!SampleBuffer::new(1).is_at_end(0.0), "empty buffer is never caught up");
}

#[test]
fn at_end_tolerates_single_precision_timestamps() {
    let mut buf = SampleBuffer::new(1);
    let t = 123.456f64;
    buf.push(Sample::new(f64::from(t as f32), vec![0.0])).unwrap();
    assert!(buf.is_at_end(t));
}

#[test]
fn reset_empties_everything() {
    let mut buf = ramp();
    buf.update(2.0, 1.0);
    buf.reset();
    assert!(buf.is_empty());
    assert_eq!(buf.get_last_data(), None);
    assert_eq!(buf.window(), None);
    let shown = buf.get_shown_data();
    assert!(shown.is_empty());
    assert_eq!(shown.channels, vec![Vec::<f64>::new(), Vec::new()]);

    // Earlier timestamps are fine again after a reset.
    buf.push(Sample::new(0.0, vec![1.0, 1.0])).unwrap();
    assert_eq!(buf.len(), 1);
}

#[test]
fn window_before_all_data_shows_nothing() {
    let mut buf = ramp();
    buf.update(-1.0, 0.5);
    assert!(buf.get_shown_data().is_empty());
    assert_eq!(buf.len(), 11, "nothing is trimmed behind a window that lies before the data");
}

use ndarray::Array3;

use pulsecam_core::error::PulseError;
use pulsecam_core::magnify::ring_buffer::TemporalRingBuffer;

#[test]
fn test_cursor_wraps_modulo_capacity() {
    let mut buffer = TemporalRingBuffer::new(7, (2, 3, 3)).unwrap();
    for n in 1..=24 {
        let level = Array3::from_elem((2, 3, 3), n as f32);
        let slot = buffer.push(&level).unwrap();
        assert_eq!(slot, (n - 1) % 7);
        assert_eq!(buffer.cursor(), n % 7);
    }
}

#[test]
fn test_push_writes_slot() {
    let mut buffer = TemporalRingBuffer::new(4, (2, 2, 3)).unwrap();
    let level = Array3::from_shape_fn((2, 2, 3), |(r, c, ch)| (r * 100 + c * 10 + ch) as f32);
    buffer.push(&Array3::zeros((2, 2, 3))).unwrap();
    let slot = buffer.push(&level).unwrap();

    assert_eq!(slot, 1);
    assert_eq!(buffer.slot(1), level.view());
    assert_eq!(buffer.slot(0), Array3::<f32>::zeros((2, 2, 3)).view());
    assert_eq!(buffer.view().dim(), (4, 2, 2, 3));
    assert!(buffer.slot(3).iter().all(|&v| v == 0.0));
}

#[test]
fn test_wrong_shape_rejected() {
    let mut buffer = TemporalRingBuffer::new(4, (5, 13, 3)).unwrap();
    let err = buffer.push(&Array3::zeros((5, 12, 3))).unwrap_err();
    assert!(matches!(err, PulseError::InvalidDimensions { .. }));

    let err = buffer.push(&Array3::zeros((5, 13, 1))).unwrap_err();
    assert!(matches!(err, PulseError::InvalidChannelCount(1)));

    // Rejected pushes leave the cursor alone
    assert_eq!(buffer.cursor(), 0);
}

#[test]
fn test_zero_capacity_rejected() {
    assert!(matches!(
        TemporalRingBuffer::new(0, (1, 1, 3)),
        Err(PulseError::InvalidConfig(_))
    ));
}

#[test]
fn test_capacity_and_dims() {
    let buffer = TemporalRingBuffer::new(150, (5, 13, 3)).unwrap();
    assert_eq!(buffer.capacity(), 150);
    assert_eq!(buffer.level_dim(), (5, 13, 3));
}

//! End-to-end properties of the levels filter.

use approx::assert_abs_diff_eq;
use levels_core::{luma_rec601, BitDepth, Channel, Frame, FrameBuffer, PixelFormatDescriptor, PixelLayout, Sample};
use levels_ops::calibrate::{calibrate, FrameCalibration};
use levels_ops::kernel::adjust_sample;
use levels_ops::{ChannelRange, LevelsConfig, LevelsFilter, OpsError, PreserveMode};

/// Deterministic pseudo-random samples (xorshift).
fn noise<T: Sample>(len: usize, seed: u32) -> Vec<T> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            T::from_f32_clipped((state % (T::MAX.to_u32() + 1)) as f32)
        })
        .collect()
}

fn frame<T: Sample>(layout: PixelLayout, width: u32, height: u32, seed: u32) -> Frame<T> {
    let stride = width as usize * layout.descriptor().step();
    Frame::from_data(width, height, stride, noise(stride * height as usize, seed)).unwrap()
}

fn filter(config: LevelsConfig, layout: PixelLayout, width: u32, workers: usize) -> LevelsFilter {
    let mut filter = LevelsFilter::new(config).unwrap().with_max_workers(workers);
    filter.negotiate_layout(layout, width).unwrap();
    filter
}

fn pixel<T: Sample>(frame: &Frame<T>, desc: &PixelFormatDescriptor, x: usize, y: u32) -> Vec<T> {
    let row = frame.row(y);
    desc.channels()
        .iter()
        .map(|&c| row[x * desc.step() + desc.offset(c).unwrap()])
        .collect()
}

fn assert_identity<T: Sample + std::fmt::Debug>(layout: PixelLayout) {
    let f = filter(LevelsConfig::default(), layout, 33, 4);
    let input = frame::<T>(layout, 33, 17, 7);
    let copied = f.process(input.clone(), false).unwrap();
    assert_eq!(copied.data(), input.data(), "{layout}");
    let in_place = f.process(copied, true).unwrap();
    assert_eq!(in_place.data(), input.data(), "{layout}");
}

#[test]
fn identity_is_lossless_for_every_layout() {
    for &layout in PixelLayout::all() {
        match layout.descriptor().depth() {
            BitDepth::U8 => assert_identity::<u8>(layout),
            BitDepth::U16 => assert_identity::<u16>(layout),
        }
    }
}

#[test]
fn identity_covers_every_8bit_value() {
    let data: Vec<u8> = (0..=255u8).flat_map(|v| [v, v, v]).collect();
    let input = Frame::from_data(256, 1, 768, data).unwrap();
    let f = filter(LevelsConfig::default(), PixelLayout::Rgb24, 256, 1);
    assert_eq!(f.process(input.clone(), true).unwrap().data(), input.data());
}

#[test]
fn monotonic_without_preservation() {
    let range = ChannelRange::new(0.13, 0.71, 0.05, 0.93);
    let config = LevelsConfig::default().with_all(range);
    let desc = PixelLayout::Rgb48.descriptor();
    let input = frame::<u16>(PixelLayout::Rgb48, 4, 4, 3);
    let cal = FrameCalibration::compute(&config, &input, &desc).unwrap();

    let red = cal.get(Channel::Red).unwrap();
    let mut prev = 0u16;
    for v in 0..=u16::MAX {
        let out = adjust_sample(red, v);
        assert!(out >= prev, "output decreased at input {v}");
        prev = out;
    }
}

#[test]
fn clipping_boundaries() {
    // in [50, 200] -> out [0, 255]
    let range = ChannelRange::new(50.0 / 255.0, 200.0 / 255.0, 0.0, 1.0);
    let f = filter(LevelsConfig::default().with_all(range), PixelLayout::Rgb24, 4, 1);
    let input = Frame::from_data(4, 1, 12, vec![0u8, 49, 50, 200, 201, 255, 125, 125, 125, 50, 200, 50]).unwrap();
    let out = f.process(input, false).unwrap();
    assert_eq!(out.data(), &[0, 0, 0, 255, 255, 255, 127, 127, 127, 0, 255, 0]);
}

#[test]
fn stores_truncate_toward_zero() {
    let range = ChannelRange::new(50.0 / 255.0, 200.0 / 255.0, 0.0, 1.0);
    let f = filter(LevelsConfig::default().with_all(range), PixelLayout::Rgb24, 1, 1);
    let input = Frame::from_data(1, 1, 3, vec![125u8, 100, 60]).unwrap();
    let out = f.process(input, false).unwrap();
    // 127.5, 85 and 17 before the store
    assert_eq!(out.data(), &[127, 85, 17]);
}

#[test]
fn clipping_boundaries_16bit() {
    let range = ChannelRange::new(0.25, 0.75, 0.0, 1.0);
    let f = filter(LevelsConfig::default().with_all(range), PixelLayout::Bgr48, 2, 1);
    let input = Frame::from_data(2, 1, 6, vec![0u16, 16384, 49151, 65535, 32000, 16383]).unwrap();
    let out = f.process(input, false).unwrap();
    assert_eq!(out.data(), &[0, 0, 65535, 65535, 31232, 0]);
}

#[test]
fn auto_detect_finds_exact_extremes() {
    let desc = PixelLayout::Abgr.descriptor();
    let mut input = frame::<u8>(PixelLayout::Abgr, 20, 10, 11);
    {
        // squeeze every sample into [30, 220] then plant known extremes
        let data = input.data_mut();
        for v in data.iter_mut() {
            *v = 30 + (*v as u16 * 190 / 255) as u8;
        }
        let r = desc.offset(Channel::Red).unwrap();
        let g = desc.offset(Channel::Green).unwrap();
        data[5 * 80 + 7 * 4 + r] = 12;
        data[9 * 80 + 19 * 4 + r] = 240;
        data[g] = 29;
    }
    let auto = ChannelRange::identity().with_auto_in_min().with_auto_in_max();

    let red = calibrate(&auto, Channel::Red, &input, &desc).unwrap();
    assert_eq!(red.in_floor, 12);
    assert_abs_diff_eq!(red.coeff, 255.0 / 228.0, epsilon = 1e-6);

    let green = calibrate(&auto.with_auto_in_min(), Channel::Green, &input, &desc).unwrap();
    assert_eq!(green.in_floor, 29);

    // auto white point only
    let white_only = ChannelRange::identity().with_auto_in_max();
    let red = calibrate(&white_only, Channel::Red, &input, &desc).unwrap();
    assert_eq!(red.in_floor, 0);
    assert_abs_diff_eq!(red.coeff, 255.0 / 240.0, epsilon = 1e-6);
}

#[test]
fn auto_levels_stretch_to_full_range() {
    let config =
        LevelsConfig::default().with_all(ChannelRange::identity().with_auto_in_min().with_auto_in_max());
    let f = filter(config, PixelLayout::Rgba64, 3, 2);
    let input = Frame::from_data(
        3,
        1,
        12,
        vec![1000u16, 2000, 3000, 0, 5000, 6000, 7000, 100, 14107, 15107, 16107, 65535],
    )
    .unwrap();
    let out = f.process(input, false).unwrap();
    // every RGB span is 13107 wide, so the stretch is exactly x5
    assert_eq!(&out.data()[..4], &[0, 0, 0, 0]);
    assert_eq!(&out.data()[4..8], &[20000, 20000, 20000, 100]);
    assert_eq!(&out.data()[8..], &[65535, 65535, 65535, 65535]);
}

#[test]
fn luminance_preservation_keeps_original_luma() {
    let range = ChannelRange::new(50.0 / 255.0, 200.0 / 255.0, 0.0, 1.0);
    let plain = filter(LevelsConfig::default().with_all(range), PixelLayout::Rgb24, 1, 1);
    let lum = filter(
        LevelsConfig::default()
            .with_all(range)
            .with_preserve(PreserveMode::Luminance),
        PixelLayout::Rgb24,
        1,
        1,
    );
    let input = Frame::from_data(1, 1, 3, vec![200u8, 100, 50]).unwrap();

    let stretched = plain.process(input.clone(), false).unwrap();
    assert_eq!(stretched.data(), &[255, 85, 0]);

    let corrected = lum.process(input, false).unwrap();
    let y = |d: &[u8]| luma_rec601([d[0] as f32, d[1] as f32, d[2] as f32]);
    assert_abs_diff_eq!(y(corrected.data()), y(&[200, 100, 50]), epsilon = 1.0);
    // hue is kept: channel order and the black blue channel survive the rescale
    assert!(corrected.data()[0] > corrected.data()[1]);
    assert_eq!(corrected.data()[2], 0);
}

#[test]
fn alpha_is_independent_of_preservation() {
    let mut config = LevelsConfig::default().with_all(ChannelRange::new(0.2, 0.6, 0.1, 0.9));
    config.alpha = ChannelRange::new(0.1, 0.8, 0.3, 1.0);
    let input = frame::<u16>(PixelLayout::Bgra64, 16, 8, 5);
    let desc = PixelLayout::Bgra64.descriptor();
    let a = desc.offset(Channel::Alpha).unwrap();

    let reference = filter(config, PixelLayout::Bgra64, 16, 3)
        .process(input.clone(), false)
        .unwrap();
    for mode in PreserveMode::ALL {
        let out = filter(config.with_preserve(mode), PixelLayout::Bgra64, 16, 3)
            .process(input.clone(), false)
            .unwrap();
        let alphas = |f: &Frame<u16>| f.data().iter().skip(a).step_by(4).copied().collect::<Vec<_>>();
        assert_eq!(alphas(&out), alphas(&reference), "{mode}");
    }
}

#[test]
fn every_preservation_mode_keeps_its_metric() {
    let range = ChannelRange::new(0.1, 0.7, 0.0, 1.0);
    let desc = PixelLayout::Rgb48.descriptor();
    let input = Frame::from_data(1, 1, 3, vec![30000u16, 20000, 12000]).unwrap();
    for mode in PreserveMode::ALL.into_iter().skip(1) {
        let f = filter(
            LevelsConfig::default().with_all(range).with_preserve(mode),
            PixelLayout::Rgb48,
            1,
            1,
        );
        let out = f.process(input.clone(), false).unwrap();
        let metric = mode.metric().unwrap();
        let to_f = |p: Vec<u16>| [p[0] as f32, p[1] as f32, p[2] as f32];
        let before = metric(to_f(pixel(&input, &desc, 0, 0)), 65535.0);
        let after = metric(to_f(pixel(&out, &desc, 0, 0)), 65535.0);
        assert_abs_diff_eq!(after / before, 1.0, epsilon = 1e-3);
    }
}

fn widen(buf: FrameBuffer) -> Vec<u16> {
    match buf {
        FrameBuffer::U8(f) => f.into_vec().into_iter().map(u16::from).collect(),
        FrameBuffer::U16(f) => f.into_vec(),
    }
}

#[test]
fn one_worker_matches_one_worker_per_row() {
    let height = 23;
    let config = LevelsConfig::default()
        .with_all(ChannelRange::new(0.05, 0.8, 0.1, 0.95))
        .with_preserve(PreserveMode::Power);
    for layout in [PixelLayout::Argb, PixelLayout::Bgr48, PixelLayout::Rgbx] {
        let one = filter(config, layout, 31, 1);
        let many = filter(config, layout, 31, height as usize);
        let (a, b): (Vec<u16>, Vec<u16>) = match layout.descriptor().depth() {
            BitDepth::U8 => {
                let input = frame::<u8>(layout, 31, height, 13);
                let a = one.on_frame(FrameBuffer::U8(input.clone()), false).unwrap();
                let b = many.on_frame(FrameBuffer::U8(input), true).unwrap();
                (widen(a), widen(b))
            }
            BitDepth::U16 => {
                let input = frame::<u16>(layout, 31, height, 13);
                let a = one.process(input.clone(), false).unwrap();
                let b = many.process(input, true).unwrap();
                (a.into_vec(), b.into_vec())
            }
        };
        assert_eq!(a, b, "{layout}");
    }
}

#[test]
fn padding_sample_is_preserved() {
    let config = LevelsConfig::default().with_all(ChannelRange::new(0.0, 1.0, 1.0, 0.0));
    let f = filter(config, PixelLayout::Rgbx, 2, 1);
    let input = Frame::from_data(2, 1, 8, vec![0u8, 10, 20, 77, 30, 40, 50, 88]).unwrap();
    let copied = f.process(input.clone(), false).unwrap();
    assert_eq!(copied.data(), &[255, 245, 235, 77, 225, 215, 205, 88]);
    let in_place = f.process(input, true).unwrap();
    assert_eq!(in_place.data(), copied.data());
}

#[test]
fn configuration_changes_apply_to_next_frame() {
    let mut f = filter(LevelsConfig::default(), PixelLayout::Rgb24, 1, 1);
    let input = Frame::from_data(1, 1, 3, vec![100u8, 100, 100]).unwrap();
    assert_eq!(f.process(input.clone(), false).unwrap().data(), &[100, 100, 100]);

    f.set_option("romin", "1").unwrap();
    f.set_option("romax", "0").unwrap();
    assert_eq!(f.process(input, false).unwrap().data(), &[155, 100, 100]);
}

#[test]
fn degenerate_auto_range_fails_fast() {
    let config =
        LevelsConfig::default().with_all(ChannelRange::identity().with_auto_in_min().with_auto_in_max());
    let f = filter(config, PixelLayout::Rgb24, 2, 1);
    let flat = Frame::from_data(2, 1, 6, vec![9u8, 1, 2, 9, 3, 4]).unwrap();
    let err = f.process(flat, false).unwrap_err();
    assert!(matches!(err, OpsError::DegenerateRange { channel: Channel::Red, value: 9 }));
    assert!(!err.is_out_of_memory());
}

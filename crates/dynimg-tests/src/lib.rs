//! Integration tests for dynimg crates.
//!
//! End-to-end pipelines that cross the codec gateway, the pixel kernels and
//! the `DynamicImage` façade: load, transform, inspect, encode, reload.

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use dynimg::{
        ColorModel, Config, DynamicImage, EncodeOptions, ErrorKind, ExternalIterator, FilterKind, ImageFormat,
        Limits, MemorySink, PixelBuffer, Rgba,
    };
    use tempfile::tempdir;

    /// Horizontal red ramp, vertical green ramp, constant blue.
    fn gradient(width: u32, height: u32) -> DynamicImage {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let r = (x * 255 / (width - 1).max(1)) as u8;
                let g = (y * 255 / (height - 1).max(1)) as u8;
                data.extend_from_slice(&[r, g, 64, 255]);
            }
        }
        DynamicImage::from_buffer(PixelBuffer::from_raw_u8(width, height, ColorModel::Rgba8, data).unwrap()).unwrap()
    }

    fn opts() -> EncodeOptions {
        EncodeOptions::default()
    }

    /// Decode -> geometry -> color -> encode -> decode, compared with the
    /// same ops applied without the codec in between.
    #[test]
    fn test_png_edit_pipeline() {
        let source = gradient(40, 30);
        let png = source.encode(ImageFormat::Png, &opts()).unwrap();

        let loaded = dynimg::load(&png, &Limits::default()).unwrap();
        assert_eq!(loaded, source);

        let edited = loaded.rotate_90().crop(5, 5, 20, 20).brighten(20).flip_horizontal();
        let bytes = edited.encode(ImageFormat::Png, &opts()).unwrap();
        let reloaded = dynimg::load(&bytes, &Limits::default()).unwrap();

        let expected = source.rotate_90().crop(5, 5, 20, 20).brighten(20).flip_horizontal();
        assert_eq!(reloaded, expected);
        assert_eq!(reloaded.dimensions(), (20, 20));
    }

    #[test]
    fn test_lossless_formats_roundtrip() {
        let base = gradient(17, 11);
        let cases = [
            (ImageFormat::Png, ColorModel::Rgba16),
            (ImageFormat::Png, ColorModel::La8),
            (ImageFormat::Tiff, ColorModel::Rgb16),
            (ImageFormat::Tiff, ColorModel::Rgba32F),
            (ImageFormat::Farbfeld, ColorModel::Rgba16),
            (ImageFormat::Qoi, ColorModel::Rgba8),
            (ImageFormat::Bmp, ColorModel::Rgb8),
            (ImageFormat::Pnm, ColorModel::Rgb8),
        ];
        for (format, model) in cases {
            let img = base.to_color(model);
            let bytes = img.encode(format, &opts()).unwrap();
            let back = dynimg::load(&bytes, &Limits::default()).unwrap();
            assert_eq!(back, img, "{format} {model}");
        }
    }

    #[test]
    fn test_jpeg_keeps_dimensions() {
        let img = gradient(33, 21).resize_exact(50, 40, FilterKind::CatmullRom);
        let jpeg = img.encode(ImageFormat::Jpeg, &opts().with_jpeg_quality(80)).unwrap();
        let back = dynimg::load(&jpeg, &Limits::default()).unwrap();
        assert_eq!(back.dimensions(), (50, 40));
        assert_eq!(back.color_model(), ColorModel::Rgb8);
    }

    #[test]
    fn test_hdr_float_pipeline() {
        let img = gradient(16, 8).into_rgb32f().brighten(-10);
        let hdr = img.encode(ImageFormat::Hdr, &opts()).unwrap();
        let back = dynimg::load(&hdr, &Limits::default()).unwrap();
        assert_eq!(back.color_model(), ColorModel::Rgb32F);
        assert_eq!(back.dimensions(), (16, 8));

        let (PixelBuffer::Rgb32F(a), PixelBuffer::Rgb32F(b)) = (img.buffer(), back.buffer()) else {
            panic!("expected float RGB");
        };
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            // RGBE keeps 8 mantissa bits per pixel.
            assert_abs_diff_eq!(x, y, epsilon = 0.01);
        }
    }

    #[test]
    fn test_save_load_through_files() {
        let dir = tempdir().unwrap();
        let img = gradient(12, 9).into_luma16();

        for name in ["a.png", "b.tif"] {
            let path = dir.path().join(name);
            img.save(&path, &opts()).unwrap();
            let bytes = std::fs::read(&path).unwrap();
            let back = dynimg::load(&bytes, &Limits::default()).unwrap();
            assert_eq!(back.dimensions(), (12, 9), "{name}");
        }

        let err = img.save(dir.path().join("d.nope"), &opts()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert!(!dir.path().join("d.nope").exists());
    }

    #[test]
    fn test_config_limits_applied() {
        let config = Config::from_yaml_str("limits:\n  max_image_width: 8\n  max_image_height: 8\n").unwrap();
        let png = gradient(9, 4).encode(ImageFormat::Png, &config.encode).unwrap();
        let err = dynimg::load(&png, &config.limits).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DimensionError);
        assert!(err.is_limit_error());

        let tight = Limits {
            max_alloc: Some(64),
            ..Limits::no_limits()
        };
        let err = dynimg::load(&png, &tight).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientMemory);
    }

    #[test]
    fn test_malformed_inputs() {
        assert_eq!(dynimg::load(&[0x00, 0x01], &Limits::default()).unwrap_err().kind(), ErrorKind::Decoding);
        assert_eq!(dynimg::load(&[], &Limits::default()).unwrap_err().kind(), ErrorKind::Decoding);

        let png = gradient(8, 8).encode(ImageFormat::Png, &opts()).unwrap();
        let truncated = &png[..png.len() / 2];
        assert_eq!(dynimg::load(truncated, &Limits::default()).unwrap_err().kind(), ErrorKind::Decoding);

        let avif = [0, 0, 0, 0x1C, b'f', b't', b'y', b'p', b'a', b'v', b'i', b'f'];
        assert_eq!(dynimg::load(&avif, &Limits::default()).unwrap_err().kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_truncated_lossless_formats_are_decoding_errors() {
        let base = gradient(16, 16);
        let cases = [
            (ImageFormat::Png, ColorModel::Rgba8),
            (ImageFormat::Tiff, ColorModel::Rgb16),
            (ImageFormat::Farbfeld, ColorModel::Rgba16),
            (ImageFormat::Qoi, ColorModel::Rgba8),
            (ImageFormat::Bmp, ColorModel::Rgb8),
            (ImageFormat::Pnm, ColorModel::Rgb8),
        ];
        for (format, model) in cases {
            let bytes = base.to_color(model).encode(format, &opts()).unwrap();
            let err = dynimg::load(&bytes[..bytes.len() / 2], &Limits::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Decoding, "{format}");
        }
    }

    #[test]
    fn test_unsupported_color_per_format() {
        let cases = [
            (ImageFormat::Jpeg, ColorModel::Rgb16),
            (ImageFormat::Png, ColorModel::Rgb32F),
            (ImageFormat::Tiff, ColorModel::La8),
        ];
        for (format, model) in cases {
            let err = DynamicImage::new(4, 4, model).encode(format, &opts()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedColor, "{format} {model}");
        }
    }

    #[test]
    fn test_seekable_sink() {
        let img = gradient(10, 10).into_rgb16();
        let mut sink = MemorySink::new();
        img.write_to(&mut sink, ImageFormat::Tiff, &opts()).unwrap();
        let bytes = sink.into_inner();
        assert_eq!(dynimg::load(&bytes, &Limits::default()).unwrap(), img);
    }

    #[test]
    fn test_pixel_iteration_matches_point_queries() {
        let img = gradient(7, 5).into_luma_alpha16();
        let (w, h) = img.dimensions();

        let via_iter = img.pixels().collect();
        assert_eq!(via_iter.len(), (w * h) as usize);
        for (x, y, px) in via_iter {
            assert_eq!(px, img.get_pixel(x, y));
        }

        // Luma expands to grey in every pixel.
        assert!(img.pixels().all(|(_, _, px)| px.r() == px.g() && px.g() == px.b()));

        let brightest = img.pixels().max_by_key(|&(_, _, px)| px.r()).unwrap();
        assert_eq!(brightest.0, w - 1);
        assert_eq!(img.pixels().skip(3).step_by(4).count(), ((w * h - 3) as usize).div_ceil(4));
    }

    #[test]
    fn test_iterator_adapters_on_pixels() {
        let img = gradient(4, 4);
        let first_row = img.pixels().take_while(|&(_, y, _)| y == 0).map(|(x, _, _)| x).collect();
        assert_eq!(first_row, vec![0, 1, 2, 3]);

        let diagonal = img.pixels().filter(|&(x, y, _)| x == y).count();
        assert_eq!(diagonal, 4);

        let red_sum = img.pixels().fold(0u32, |acc, (_, _, px)| acc + px.r() as u32);
        let expected: u32 = (0..4).map(|y| (0..4).map(|x| img.get_pixel(x, y).r() as u32).sum::<u32>()).sum();
        assert_eq!(red_sum, expected);

        let twice_flipped = img.flip_horizontal().flip_horizontal();
        let a = img.pixels().map(|(_, _, px)| px);
        let b = twice_flipped.pixels().map(|(_, _, px)| px);
        assert!(a.eq(b));

        let mut peek = img.pixels().peekable();
        assert_eq!(peek.peek().map(|p| (p.0, p.1)), Some((0, 0)));
        assert_eq!(peek.into_external().count(), 16);
    }

    #[test]
    fn test_owned_iterator_crosses_threads() {
        let img = gradient(6, 6);
        let expected = img.get_pixel(5, 5);
        let it: ExternalIterator<'static, (u32, u32, Rgba)> = img.into_pixels();
        let last = std::thread::spawn(move || it.last()).join().unwrap();
        assert_eq!(last, Some((5, 5, expected)));
    }

    #[test]
    fn test_thumbnail_and_fill_pipeline() {
        let img = gradient(120, 80);
        let thumb = img.thumbnail(30, 30);
        assert_eq!(thumb.dimensions(), (30, 20));
        let filled = img.resize_to_fill(30, 30, FilterKind::Lanczos3);
        assert_eq!(filled.dimensions(), (30, 30));
        let bytes = filled.encode(ImageFormat::Qoi, &opts()).unwrap();
        assert_eq!(dynimg::load(&bytes, &Limits::default()).unwrap(), filled);
    }

    #[test]
    fn test_filters_keep_layout_across_depths() {
        for model in [ColorModel::Rgb8, ColorModel::Rgba16, ColorModel::Rgb32F] {
            let img = gradient(9, 9).to_color(model);
            let out = img
                .blur(1.0)
                .unsharpen(0.8, 2)
                .filter_3x3(&[0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0])
                .unwrap()
                .adjust_contrast(15.0)
                .huerotate(45);
            assert_eq!(out.color_model(), model);
            assert_eq!(out.dimensions(), (9, 9));
        }
    }

    #[test]
    fn test_gateway_direct_use() {
        let buf = gradient(5, 3).into_buffer();
        let mut calls = 0;
        dynimg_io::encode_with(&buf, &mut |bytes: &[u8], w: u32, h: u32, _c: dynimg_core::ExtendedColorType| {
            calls += 1;
            assert_eq!(bytes.len(), (w * h * 4) as usize);
            Ok::<(), dynimg_core::Error>(())
        })
        .unwrap();
        assert_eq!(calls, 1);

        let luma = dynimg_ops::convert::convert(&buf, ColorModel::L8);
        assert_eq!(luma.as_bytes().len(), 15);
    }
}

use face_common::PixelRect;
use image::{Rgb, RgbImage};

fn clip(image: &RgbImage, rect: PixelRect) -> Option<PixelRect> {
    rect.padded_within(0, image.width(), image.height())
}

/// Per-channel mean over the part of `rect` inside the image
pub fn mean_color(image: &RgbImage, rect: PixelRect) -> Option<[f32; 3]> {
    let area = clip(image, rect)?;
    let mut sum = [0.0f64; 3];
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            let p = image.get_pixel(x as u32, y as u32);
            for c in 0..3 {
                sum[c] += p[c] as f64;
            }
        }
    }
    let n = area.area() as f64;
    Some([(sum[0] / n) as f32, (sum[1] / n) as f32, (sum[2] / n) as f32])
}

/// Per-channel median over the part of `rect` inside the image. An even
/// sample count averages the two middle values, truncating.
pub fn median_color(image: &RgbImage, rect: PixelRect) -> Option<Rgb<u8>> {
    let area = clip(image, rect)?;
    let mut channels: [Vec<u8>; 3] = Default::default();
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            let p = image.get_pixel(x as u32, y as u32);
            for c in 0..3 {
                channels[c].push(p[c]);
            }
        }
    }
    let median = |values: &mut Vec<u8>| {
        values.sort_unstable();
        let mid = values.len() / 2;
        if values.len() % 2 == 0 {
            ((values[mid - 1] as u16 + values[mid] as u16) / 2) as u8
        } else {
            values[mid]
        }
    };
    let [mut r, mut g, mut b] = channels;
    Some(Rgb([median(&mut r), median(&mut g), median(&mut b)]))
}

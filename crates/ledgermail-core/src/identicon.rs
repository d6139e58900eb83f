//! Blockies-style identicons
//!
//! An 8x8 horizontally mirrored grid in three colours, seeded from the
//! lowercased address, rendered as an SVG `data:` URI.

use base64::prelude::*;

const SIZE: usize = 8;
const SCALE: usize = 8;

/// xorshift generator seeded the same way as the blockies scheme
struct SeedRng {
    state: [i32; 4],
}

impl SeedRng {
    fn new(seed: &str) -> Self {
        let mut state = [0i32; 4];
        for (i, unit) in seed.encode_utf16().enumerate() {
            let slot = &mut state[i % 4];
            *slot = slot
                .wrapping_shl(5)
                .wrapping_sub(*slot)
                .wrapping_add(i32::from(unit));
        }
        Self { state }
    }

    /// Next value in `[0, 1)`
    fn next(&mut self) -> f64 {
        let t = self.state[0] ^ self.state[0].wrapping_shl(11);
        self.state[0] = self.state[1];
        self.state[1] = self.state[2];
        self.state[2] = self.state[3];
        self.state[3] = self.state[3] ^ (self.state[3] >> 19) ^ t ^ (t >> 8);
        f64::from(self.state[3] as u32) / 4_294_967_296.0
    }

    fn color(&mut self) -> String {
        let hue = (self.next() * 360.0).floor();
        let saturation = self.next() * 60.0 + 40.0;
        let lightness = (self.next() + self.next() + self.next() + self.next()) * 25.0;
        format!("hsl({},{:.1}%,{:.1}%)", hue, saturation, lightness)
    }

    /// Cell values: 0 background, 1 foreground, 2 spot
    fn cells(&mut self) -> Vec<u8> {
        let data_width = SIZE.div_ceil(2);
        let mirror_width = SIZE - data_width;
        let mut cells = Vec::with_capacity(SIZE * SIZE);

        for _ in 0..SIZE {
            let row: Vec<u8> = (0..data_width)
                .map(|_| (self.next() * 2.3).floor() as u8)
                .collect();
            cells.extend_from_slice(&row);
            cells.extend(row[..mirror_width].iter().rev());
        }
        cells
    }
}

/// Render the identicon for `address` as an SVG document
pub fn svg(address: &str) -> String {
    let mut rng = SeedRng::new(&address.to_lowercase());
    let color = rng.color();
    let background = rng.color();
    let spot = rng.color();
    let cells = rng.cells();

    let side = SIZE * SCALE;
    let mut out = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{side}" height="{side}" viewBox="0 0 {SIZE} {SIZE}" shape-rendering="crispEdges"><rect width="{SIZE}" height="{SIZE}" fill="{background}"/>"#
    );
    for (i, cell) in cells.iter().enumerate() {
        let fill = match *cell {
            1 => &color,
            2 => &spot,
            _ => continue,
        };
        out.push_str(&format!(
            r#"<rect x="{}" y="{}" width="1" height="1" fill="{}"/>"#,
            i % SIZE,
            i / SIZE,
            fill
        ));
    }
    out.push_str("</svg>");
    out
}

/// Identicon as a `data:image/svg+xml;base64,...` URI
pub fn data_uri(address: &str) -> String {
    format!(
        "data:image/svg+xml;base64,{}",
        BASE64_STANDARD.encode(svg(address))
    )
}

//! Destructible bunkers: dome block mask, random placement, per-block HP

use glam::Vec2;
use rand::Rng;

use crate::tuning::ShieldTuning;

/// True if grid cell (`col`, `row`) is part of the dome
pub fn is_dome_block(tuning: &ShieldTuning, col: usize, row: usize) -> bool {
    let w = tuning.columns as f32;
    let h = tuning.rows as f32;
    let cx = (w - 1.0) / 2.0;
    let cy = (h - 1.0) / 2.0;

    let dx = (col as f32 - cx) / (w / 2.0);
    let dy = (row as f32 - cy) / (h / 2.0);
    if dx * dx + dy * dy > 1.0 {
        return false;
    }

    // arch opening at the bottom centre
    let in_arch_rows = row + tuning.arch_height >= tuning.rows;
    !(in_arch_rows && (col as f32 - cx).abs() < tuning.arch_half_width)
}

/// Left edge x of each bunker, sorted ascending.
///
/// Tries random placements that keep `min_spacing` between bunkers and falls
/// back to an even spread if none fits.
pub fn bunker_positions<R: Rng + ?Sized>(tuning: &ShieldTuning, canvas_width: f32, rng: &mut R) -> Vec<f32> {
    let count = tuning.count;
    if count == 0 {
        return Vec::new();
    }
    let bunker_width = tuning.columns as f32 * tuning.block_size;
    let margin = tuning.x_margin;
    let max_x = canvas_width - margin - bunker_width;

    if max_x > margin {
        for _ in 0..tuning.placement_attempts {
            let mut xs: Vec<f32> = (0..count).map(|_| rng.random_range(margin..max_x)).collect();
            xs.sort_by(f32::total_cmp);
            if xs.windows(2).all(|pair| pair[1] - pair[0] >= tuning.min_spacing + bunker_width) {
                return xs;
            }
        }
    }

    log::debug!("Shield placement fell back to even spacing");
    let gap = (canvas_width - count as f32 * bunker_width) / (count as f32 + 1.0);
    (0..count)
        .map(|i| gap + i as f32 * (bunker_width + gap))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShieldBlock {
    /// Block centre
    pub pos: Vec2,
    pub hp: u32,
    pub max_hp: u32,
}

impl ShieldBlock {
    /// Take one hit. Returns true while the block is still standing.
    pub fn hit(&mut self) -> bool {
        self.hp = self.hp.saturating_sub(1);
        self.hp > 0
    }

    pub fn is_destroyed(&self) -> bool {
        self.hp == 0
    }
}

/// Every block of every bunker for one wave
#[derive(Debug, Clone, Default)]
pub struct Shields {
    blocks: Vec<ShieldBlock>,
}

impl Shields {
    /// Lay out all bunkers. `block_hp` of 0 means no shields at all.
    pub fn build<R: Rng + ?Sized>(tuning: &ShieldTuning, canvas_width: f32, block_hp: u32, rng: &mut R) -> Self {
        if block_hp == 0 {
            return Self::default();
        }
        let size = tuning.block_size;
        let mut blocks = Vec::new();
        for left in bunker_positions(tuning, canvas_width, rng) {
            for row in 0..tuning.rows {
                for col in 0..tuning.columns {
                    if is_dome_block(tuning, col, row) {
                        blocks.push(ShieldBlock {
                            pos: Vec2::new(
                                left + col as f32 * size + size / 2.0,
                                tuning.y_position + row as f32 * size + size / 2.0,
                            ),
                            hp: block_hp,
                            max_hp: block_hp,
                        });
                    }
                }
            }
        }
        Self { blocks }
    }

    pub fn blocks(&self) -> &[ShieldBlock] {
        &self.blocks
    }

    pub fn standing_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_destroyed()).count()
    }

    /// Hit block `index`. `None` for an unknown or already destroyed block,
    /// otherwise whether it survived.
    pub fn hit(&mut self, index: usize) -> Option<bool> {
        let block = self.blocks.get_mut(index)?;
        if block.is_destroyed() {
            return None;
        }
        Some(block.hit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_dome_mask() {
        let tuning = ShieldTuning::default();
        // corners are outside the ellipse
        assert!(!is_dome_block(&tuning, 0, 0));
        assert!(!is_dome_block(&tuning, 15, 0));
        // solid centre
        assert!(is_dome_block(&tuning, 7, 4));
        // arch cut-out in the bottom four rows around the centre
        assert!(!is_dome_block(&tuning, 7, 11));
        assert!(!is_dome_block(&tuning, 8, 8));
        assert!(is_dome_block(&tuning, 7, 7));
        // left-right symmetric
        for row in 0..12 {
            for col in 0..16 {
                assert_eq!(is_dome_block(&tuning, col, row), is_dome_block(&tuning, 15 - col, row));
            }
        }
    }

    #[test]
    fn test_positions_respect_spacing() {
        let tuning = ShieldTuning::default();
        let width = tuning.columns as f32 * tuning.block_size;
        for seed in 0..20 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let xs = bunker_positions(&tuning, 480.0, &mut rng);
            assert_eq!(xs.len(), 3);
            for pair in xs.windows(2) {
                assert!(pair[1] - pair[0] >= tuning.min_spacing + width - 1e-3);
            }
        }
    }

    #[test]
    fn test_positions_fallback_when_crowded() {
        let tuning = ShieldTuning {
            count: 4,
            min_spacing: 400.0,
            ..ShieldTuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let xs = bunker_positions(&tuning, 480.0, &mut rng);
        // (480 - 4*48) / 5
        assert_eq!(xs.len(), 4);
        assert!((xs[0] - 57.6).abs() < 1e-3);
        assert!((xs[1] - xs[0] - 105.6).abs() < 1e-3);
    }

    #[test]
    fn test_block_hits() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut shields = Shields::build(&ShieldTuning::default(), 480.0, 3, &mut rng);
        let total = shields.blocks().len();
        assert!(total > 0);
        assert_eq!(total % 3, 0);
        assert_eq!(shields.hit(0), Some(true));
        assert_eq!(shields.hit(0), Some(true));
        assert_eq!(shields.hit(0), Some(false));
        assert_eq!(shields.hit(0), None);
        assert_eq!(shields.standing_count(), total - 1);
        assert_eq!(shields.hit(total), None);
    }

    #[test]
    fn test_zero_hp_disables_shields() {
        let mut rng = Pcg32::seed_from_u64(2);
        let shields = Shields::build(&ShieldTuning::default(), 480.0, 0, &mut rng);
        assert!(shields.blocks().is_empty());
    }
}

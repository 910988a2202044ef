//! Stage descriptors and stage instantiation
//!
//! A [`StageDescriptor`] is read-only layout data; [`StageDescriptor::build`]
//! turns it into a fresh mutable [`Stage`]. The ten built-in stages can be
//! replaced by JSON supplied by the host.

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::state::{Hazard, Palette, Platform, PlatformKind, Plot, Seed, Stage};
use crate::consts::*;
use crate::tuning::TuningError;

/// An oscillating orb spawn point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbSpawn {
    pub x: f32,
    pub base_y: f32,
}

/// Static layout for one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDescriptor {
    pub name: String,
    pub length: f32,
    #[serde(default)]
    pub palette: Palette,
    /// Elevated rock platforms
    #[serde(default)]
    pub steps: Vec<Rect>,
    /// Spike x positions on the ground line
    #[serde(default)]
    pub spikes: Vec<f32>,
    #[serde(default)]
    pub orbs: Vec<OrbSpawn>,
    /// Seed x positions; each seed also spawns a plot to its right
    #[serde(default)]
    pub seed_xs: Vec<f32>,
}

impl StageDescriptor {
    /// Instantiate a fresh world for this layout
    pub fn build(&self, index: usize) -> Stage {
        let mut platforms = Vec::with_capacity(self.steps.len() + 1);
        platforms.push(Platform {
            rect: Rect::new(0.0, GROUND_Y, self.length, GROUND_DEPTH),
            kind: PlatformKind::Ground,
        });
        platforms.extend(self.steps.iter().map(|&rect| Platform {
            rect,
            kind: PlatformKind::Elevated,
        }));

        let mut hazards: Vec<Hazard> = self.spikes.iter().map(|&x| Hazard::spike(x)).collect();
        hazards.extend(self.orbs.iter().map(|o| Hazard::orb(o.x, o.base_y)));

        let mut seeds = Vec::with_capacity(self.seed_xs.len());
        let mut plots = Vec::with_capacity(self.seed_xs.len());
        for &sx in &self.seed_xs {
            // probe just left of the seed centre
            let seed_y = surface_y(&platforms, sx + SEED_SIZE * 0.375) - SEED_LIFT;
            seeds.push(Seed {
                rect: Rect::new(sx, seed_y, SEED_SIZE, SEED_SIZE),
                taken: false,
            });

            let plot_x = sx + PLOT_OFFSET_X;
            let plot_y = surface_y(&platforms, plot_x + PLOT_WIDTH / 2.0) - PLOT_HEIGHT;
            plots.push(Plot::new(Rect::new(plot_x, plot_y, PLOT_WIDTH, PLOT_HEIGHT)));
        }

        Stage {
            index,
            name: self.name.clone(),
            length: self.length,
            palette: self.palette,
            platforms,
            hazards,
            seeds,
            plots,
            cam_x: 0.0,
        }
    }
}

/// Highest surface (smallest y) under `x`, falling back to the ground line
pub fn surface_y(platforms: &[Platform], x: f32) -> f32 {
    platforms
        .iter()
        .filter(|p| p.rect.spans_x(x))
        .map(|p| p.rect.y)
        .fold(GROUND_Y, f32::min)
}

/// Parse a stage list supplied by the host
pub fn stages_from_json(json: &str) -> Result<Vec<StageDescriptor>, TuningError> {
    let stages: Vec<StageDescriptor> = serde_json::from_str(json)?;
    if stages.is_empty() {
        return Err(TuningError::NoStages);
    }
    for stage in &stages {
        if !(stage.length > 0.0) {
            return Err(TuningError::Invalid {
                field: "stage.length",
                reason: format!("stage `{}` has non-positive length", stage.name),
            });
        }
    }
    Ok(stages)
}

#[allow(clippy::too_many_arguments)]
fn layout(
    name: &str,
    length: f32,
    palette: Palette,
    step_height: f32,
    steps: &[(f32, f32, f32)],
    spikes: &[f32],
    orbs: &[(f32, f32)],
    seed_xs: &[f32],
) -> StageDescriptor {
    StageDescriptor {
        name: name.to_string(),
        length,
        palette,
        steps: steps
            .iter()
            .map(|&(x, y, w)| Rect::new(x, y, w, step_height))
            .collect(),
        spikes: spikes.to_vec(),
        orbs: orbs
            .iter()
            .map(|&(x, base_y)| OrbSpawn { x, base_y })
            .collect(),
        seed_xs: seed_xs.to_vec(),
    }
}

const fn palette(sky_top: [u8; 3], sky_bottom: [u8; 3], haze: [u8; 3]) -> Palette {
    Palette {
        sky_top,
        sky_bottom,
        haze,
    }
}

/// The ten stages of the standard campaign
pub fn builtin_stages() -> Vec<StageDescriptor> {
    vec![
        layout(
            "Stage 1 - Parched Outskirts",
            3600.0,
            palette([255, 190, 120], [220, 140, 80], [90, 55, 20]),
            24.0,
            &[
                (260.0, 370.0, 170.0), (520.0, 330.0, 140.0), (760.0, 290.0, 140.0),
                (1040.0, 355.0, 220.0), (1360.0, 315.0, 160.0), (1620.0, 275.0, 160.0),
                (1920.0, 345.0, 220.0), (2260.0, 305.0, 160.0), (2520.0, 265.0, 160.0),
                (2820.0, 345.0, 240.0), (3180.0, 315.0, 180.0),
            ],
            &[740.0, 1240.0, 2100.0, 3040.0],
            &[(920.0, 240.0), (1760.0, 220.0), (3340.0, 210.0)],
            &[560.0, 820.0, 1460.0, 1700.0, 2360.0, 2620.0, 3300.0],
        ),
        layout(
            "Stage 2 - Dried Riverbed",
            4000.0,
            palette([210, 180, 160], [165, 140, 120], [75, 60, 45]),
            24.0,
            &[
                (280.0, 365.0, 160.0), (560.0, 315.0, 140.0), (840.0, 270.0, 140.0),
                (1140.0, 335.0, 220.0), (1480.0, 290.0, 160.0), (1760.0, 250.0, 160.0),
                (2080.0, 330.0, 230.0), (2440.0, 285.0, 150.0), (2700.0, 240.0, 150.0),
                (3040.0, 310.0, 240.0), (3440.0, 270.0, 190.0), (3740.0, 235.0, 170.0),
            ],
            &[720.0, 1320.0, 2320.0, 3120.0, 3560.0],
            &[(980.0, 220.0), (1960.0, 210.0), (3860.0, 205.0)],
            &[620.0, 900.0, 1540.0, 1800.0, 2520.0, 2780.0, 3460.0, 3800.0],
        ),
        layout(
            "Stage 3 - Toxic Air and Ruins",
            4500.0,
            palette([80, 90, 110], [45, 50, 70], [45, 40, 60]),
            22.0,
            &[
                (260.0, 365.0, 160.0), (520.0, 325.0, 150.0), (780.0, 295.0, 150.0),
                (1040.0, 335.0, 240.0), (1360.0, 305.0, 180.0), (1600.0, 280.0, 170.0),
                (1840.0, 250.0, 180.0), (2100.0, 295.0, 240.0), (2440.0, 275.0, 160.0),
                (2700.0, 250.0, 160.0), (2960.0, 300.0, 260.0), (3280.0, 275.0, 200.0),
                (3560.0, 245.0, 190.0), (3860.0, 220.0, 170.0), (4100.0, 265.0, 240.0),
            ],
            &[680.0, 1760.0, 2360.0, 3280.0, 3720.0, 4160.0],
            &[(760.0, 210.0), (2880.0, 185.0), (4380.0, 200.0)],
            &[640.0, 940.0, 1600.0, 1860.0, 2540.0, 2800.0, 3500.0, 3840.0, 4200.0],
        ),
        layout(
            "Stage 4 - Sandstorm Belt",
            4800.0,
            palette([180, 150, 120], [110, 80, 55], [95, 70, 40]),
            22.0,
            &[
                (320.0, 350.0, 150.0), (650.0, 300.0, 120.0), (980.0, 250.0, 120.0),
                (1260.0, 320.0, 200.0), (1600.0, 270.0, 150.0), (1900.0, 225.0, 140.0),
                (2250.0, 310.0, 230.0), (2640.0, 260.0, 130.0), (2940.0, 215.0, 130.0),
                (3260.0, 280.0, 240.0), (3650.0, 245.0, 170.0), (4020.0, 200.0, 150.0),
                (4340.0, 260.0, 220.0), (4620.0, 250.0, 140.0),
            ],
            &[
                760.0, 1120.0, 1480.0, 1760.0, 2100.0, 2460.0, 2860.0, 3180.0, 3520.0, 3880.0,
                4280.0, 4560.0,
            ],
            &[
                (840.0, 205.0), (1700.0, 190.0), (2600.0, 180.0), (3400.0, 190.0),
                (4200.0, 200.0), (4700.0, 210.0),
            ],
            &[700.0, 1000.0, 1680.0, 2050.0, 2750.0, 3000.0, 3650.0, 4050.0, 4400.0, 4700.0],
        ),
        layout(
            "Stage 5 - The Deep: Collapsed Lab",
            5200.0,
            palette([60, 70, 90], [20, 20, 35], [40, 30, 50]),
            20.0,
            &[
                (320.0, 355.0, 140.0), (640.0, 300.0, 115.0), (960.0, 245.0, 115.0),
                (1280.0, 320.0, 190.0), (1620.0, 265.0, 135.0), (1920.0, 215.0, 130.0),
                (2280.0, 305.0, 210.0), (2680.0, 255.0, 125.0), (2980.0, 205.0, 125.0),
                (3320.0, 295.0, 230.0), (3720.0, 235.0, 160.0), (4080.0, 200.0, 140.0),
                (4400.0, 280.0, 210.0), (4760.0, 235.0, 160.0), (5060.0, 205.0, 120.0),
            ],
            &[
                720.0, 900.0, 1180.0, 1500.0, 1760.0, 2060.0, 2400.0, 2600.0, 2920.0, 3160.0,
                3480.0, 3700.0, 4020.0, 4300.0, 4580.0, 4880.0, 5100.0,
            ],
            &[
                (820.0, 200.0), (1480.0, 185.0), (2140.0, 175.0), (2860.0, 170.0),
                (3600.0, 180.0), (4480.0, 190.0), (5160.0, 205.0),
            ],
            &[
                780.0, 1020.0, 1600.0, 1960.0, 2700.0, 3000.0, 3720.0, 4100.0, 4420.0, 4760.0,
                5100.0,
            ],
        ),
        layout(
            "Stage 6 - Acid Rain Zone",
            5500.0,
            palette([52, 62, 82], [12, 12, 27], [35, 25, 45]),
            20.0,
            &[
                (300.0, 350.0, 135.0), (620.0, 295.0, 110.0), (940.0, 240.0, 110.0),
                (1260.0, 315.0, 185.0), (1600.0, 260.0, 130.0), (1900.0, 210.0, 125.0),
                (2260.0, 300.0, 205.0), (2660.0, 250.0, 120.0), (2960.0, 200.0, 120.0),
                (3300.0, 290.0, 225.0), (3700.0, 230.0, 155.0), (4060.0, 195.0, 135.0),
                (4380.0, 275.0, 205.0), (4740.0, 230.0, 155.0), (5040.0, 200.0, 115.0),
                (5300.0, 270.0, 160.0),
            ],
            &[
                700.0, 880.0, 1160.0, 1480.0, 1740.0, 2040.0, 2380.0, 2580.0, 2900.0, 3140.0,
                3460.0, 3680.0, 4000.0, 4280.0, 4560.0, 4860.0, 5080.0, 5280.0,
            ],
            &[
                (800.0, 195.0), (1460.0, 180.0), (2120.0, 170.0), (2840.0, 165.0),
                (3580.0, 175.0), (4460.0, 185.0), (5140.0, 200.0), (5420.0, 210.0),
            ],
            &[
                760.0, 1000.0, 1580.0, 1940.0, 2680.0, 2980.0, 3700.0, 4080.0, 4400.0, 4740.0,
                5080.0, 5360.0,
            ],
        ),
        layout(
            "Stage 7 - Abyssal Rift",
            5800.0,
            palette([44, 54, 74], [4, 4, 19], [30, 20, 40]),
            20.0,
            &[
                (280.0, 345.0, 130.0), (600.0, 290.0, 105.0), (920.0, 235.0, 105.0),
                (1240.0, 310.0, 180.0), (1580.0, 255.0, 125.0), (1880.0, 205.0, 120.0),
                (2240.0, 295.0, 200.0), (2640.0, 245.0, 115.0), (2940.0, 195.0, 115.0),
                (3280.0, 285.0, 220.0), (3680.0, 225.0, 150.0), (4040.0, 190.0, 130.0),
                (4360.0, 270.0, 200.0), (4720.0, 225.0, 150.0), (5020.0, 195.0, 110.0),
                (5280.0, 265.0, 155.0), (5600.0, 235.0, 140.0),
            ],
            &[
                680.0, 860.0, 1140.0, 1460.0, 1720.0, 2020.0, 2360.0, 2560.0, 2880.0, 3120.0,
                3440.0, 3660.0, 3980.0, 4260.0, 4540.0, 4840.0, 5060.0, 5260.0, 5480.0,
            ],
            &[
                (780.0, 190.0), (1440.0, 175.0), (2100.0, 165.0), (2820.0, 160.0),
                (3560.0, 170.0), (4440.0, 180.0), (5120.0, 195.0), (5400.0, 205.0),
                (5720.0, 215.0),
            ],
            &[
                740.0, 980.0, 1560.0, 1920.0, 2660.0, 2960.0, 3680.0, 4060.0, 4380.0, 4720.0,
                5060.0, 5340.0, 5660.0,
            ],
        ),
        layout(
            "Stage 8 - Fields of Wreckage",
            6100.0,
            palette([36, 46, 66], [0, 0, 11], [25, 15, 35]),
            20.0,
            &[
                (260.0, 340.0, 125.0), (580.0, 285.0, 100.0), (900.0, 230.0, 100.0),
                (1220.0, 305.0, 175.0), (1560.0, 250.0, 120.0), (1860.0, 200.0, 115.0),
                (2220.0, 290.0, 195.0), (2620.0, 240.0, 110.0), (2920.0, 190.0, 110.0),
                (3260.0, 280.0, 215.0), (3660.0, 220.0, 145.0), (4020.0, 185.0, 125.0),
                (4340.0, 265.0, 195.0), (4700.0, 220.0, 145.0), (5000.0, 190.0, 105.0),
                (5260.0, 260.0, 150.0), (5580.0, 230.0, 135.0), (5880.0, 200.0, 160.0),
            ],
            &[
                660.0, 840.0, 1120.0, 1440.0, 1700.0, 2000.0, 2340.0, 2540.0, 2860.0, 3100.0,
                3420.0, 3640.0, 3960.0, 4240.0, 4520.0, 4820.0, 5040.0, 5240.0, 5460.0, 5780.0,
            ],
            &[
                (760.0, 185.0), (1420.0, 170.0), (2080.0, 160.0), (2800.0, 155.0),
                (3540.0, 165.0), (4420.0, 175.0), (5100.0, 190.0), (5380.0, 200.0),
                (5700.0, 210.0), (6020.0, 220.0),
            ],
            &[
                720.0, 960.0, 1540.0, 1900.0, 2640.0, 2940.0, 3660.0, 4040.0, 4360.0, 4700.0,
                5040.0, 5320.0, 5640.0, 5960.0,
            ],
        ),
        layout(
            "Stage 9 - Edge of the End",
            6400.0,
            palette([28, 38, 58], [0, 0, 3], [20, 10, 30]),
            20.0,
            &[
                (240.0, 335.0, 120.0), (560.0, 280.0, 95.0), (880.0, 225.0, 95.0),
                (1200.0, 300.0, 170.0), (1540.0, 245.0, 115.0), (1840.0, 195.0, 110.0),
                (2200.0, 285.0, 190.0), (2600.0, 235.0, 105.0), (2900.0, 185.0, 105.0),
                (3240.0, 275.0, 210.0), (3640.0, 215.0, 140.0), (4000.0, 180.0, 120.0),
                (4320.0, 260.0, 190.0), (4680.0, 215.0, 140.0), (4980.0, 185.0, 100.0),
                (5240.0, 255.0, 145.0), (5560.0, 225.0, 130.0), (5860.0, 195.0, 155.0),
                (6160.0, 265.0, 180.0),
            ],
            &[
                640.0, 820.0, 1100.0, 1420.0, 1680.0, 1980.0, 2320.0, 2520.0, 2840.0, 3080.0,
                3400.0, 3620.0, 3940.0, 4220.0, 4500.0, 4800.0, 5020.0, 5220.0, 5440.0, 5760.0,
                6060.0,
            ],
            &[
                (740.0, 180.0), (1400.0, 165.0), (2060.0, 155.0), (2780.0, 150.0),
                (3520.0, 160.0), (4400.0, 170.0), (5080.0, 185.0), (5360.0, 195.0),
                (5680.0, 205.0), (6000.0, 215.0), (6320.0, 225.0),
            ],
            &[
                700.0, 940.0, 1520.0, 1880.0, 2620.0, 2920.0, 3640.0, 4020.0, 4340.0, 4680.0,
                5020.0, 5300.0, 5620.0, 5940.0, 6240.0,
            ],
        ),
        layout(
            "Stage 10 - Seed of Hope",
            6700.0,
            palette([20, 30, 50], [0, 0, 0], [15, 5, 25]),
            20.0,
            &[
                (220.0, 330.0, 115.0), (540.0, 275.0, 90.0), (860.0, 220.0, 90.0),
                (1180.0, 295.0, 165.0), (1520.0, 240.0, 110.0), (1820.0, 190.0, 105.0),
                (2180.0, 280.0, 185.0), (2580.0, 230.0, 100.0), (2880.0, 180.0, 100.0),
                (3220.0, 270.0, 205.0), (3620.0, 210.0, 135.0), (3980.0, 175.0, 115.0),
                (4300.0, 255.0, 185.0), (4660.0, 210.0, 135.0), (4960.0, 180.0, 95.0),
                (5220.0, 250.0, 140.0), (5540.0, 220.0, 125.0), (5840.0, 190.0, 150.0),
                (6140.0, 260.0, 175.0), (6460.0, 230.0, 180.0),
            ],
            &[
                620.0, 800.0, 1080.0, 1400.0, 1660.0, 1960.0, 2300.0, 2500.0, 2820.0, 3060.0,
                3380.0, 3600.0, 3920.0, 4200.0, 4480.0, 4780.0, 5000.0, 5200.0, 5420.0, 5740.0,
                6040.0, 6340.0,
            ],
            &[
                (720.0, 175.0), (1380.0, 160.0), (2040.0, 150.0), (2760.0, 145.0),
                (3500.0, 155.0), (4380.0, 165.0), (5060.0, 180.0), (5340.0, 190.0),
                (5660.0, 200.0), (5980.0, 210.0), (6300.0, 220.0), (6620.0, 230.0),
            ],
            &[
                680.0, 920.0, 1500.0, 1860.0, 2600.0, 2900.0, 3620.0, 4000.0, 4320.0, 4660.0,
                5000.0, 5280.0, 5600.0, 5920.0, 6220.0, 6520.0,
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::HazardKind;

    #[test]
    fn test_builtin_campaign_shape() {
        let stages = builtin_stages();
        assert_eq!(stages.len(), 10);
        assert_eq!(stages[0].seed_xs.len(), 7);
        for pair in stages.windows(2) {
            assert!(pair[1].length > pair[0].length);
        }
    }

    #[test]
    fn test_build_stage_one() {
        let stage = builtin_stages()[0].build(0);
        assert_eq!(stage.platforms[0].kind, PlatformKind::Ground);
        assert_eq!(stage.platforms[0].rect.w, 3600.0);
        assert_eq!(stage.platforms.len(), 12);
        assert_eq!(stage.seeds.len(), 7);
        assert_eq!(stage.total_plots(), 7);
        let spikes = stage
            .hazards
            .iter()
            .filter(|h| h.kind == HazardKind::Spike)
            .count();
        assert_eq!(spikes, 4);
        assert_eq!(stage.hazards.len(), 7);
    }

    #[test]
    fn test_seed_and_plot_rest_on_surfaces() {
        let stage = builtin_stages()[0].build(0);
        // seed at 560: centre 569 lies on the rock at x=520..660, y=330
        assert_eq!(stage.seeds[0].rect.y, 330.0 - SEED_LIFT);
        // plot at 650: centre 664 is past that rock, so it sits on the ground
        assert_eq!(stage.plots[0].rect.x, 650.0);
        assert_eq!(stage.plots[0].rect.y, GROUND_Y - PLOT_HEIGHT);
    }

    #[test]
    fn test_surface_prefers_highest_platform() {
        let platforms = [
            Platform {
                rect: Rect::new(0.0, GROUND_Y, 1000.0, GROUND_DEPTH),
                kind: PlatformKind::Ground,
            },
            Platform {
                rect: Rect::new(100.0, 300.0, 100.0, 20.0),
                kind: PlatformKind::Elevated,
            },
            Platform {
                rect: Rect::new(150.0, 250.0, 100.0, 20.0),
                kind: PlatformKind::Elevated,
            },
        ];
        assert_eq!(surface_y(&platforms, 120.0), 300.0);
        assert_eq!(surface_y(&platforms, 160.0), 250.0);
        assert_eq!(surface_y(&platforms, 900.0), GROUND_Y);
        assert_eq!(surface_y(&[], 10.0), GROUND_Y);
    }

    #[test]
    fn test_stages_from_json() {
        let json = r#"[{ "name": "Test", "length": 800.0, "seed_xs": [200.0] }]"#;
        let stages = stages_from_json(json).unwrap();
        assert_eq!(stages[0].seed_xs, vec![200.0]);
        assert!(stages[0].steps.is_empty());

        assert!(matches!(stages_from_json("[]"), Err(TuningError::NoStages)));
        assert!(matches!(
            stages_from_json(r#"[{ "name": "Bad", "length": 0.0 }]"#),
            Err(TuningError::Invalid { .. })
        ));
    }
}

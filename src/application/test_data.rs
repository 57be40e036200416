// Synthetic mobile dataset for pipeline and API tests.
//
// `ram` alone decides the price range (one 1000 MB band per
// range); every other column is deterministic filler that does
// not depend on the label.

use std::path::Path;

use crate::application::train_use_case::TrainConfig;
use crate::data::writer::write_csv;
use crate::domain::record::{MobileFeatures, FEATURE_NAMES, LABEL_COLUMN};
use crate::domain::table::Table;

fn filler(column: usize, row: usize) -> f64 {
    let spread = (row * (column * 7 + 3) + column * 11) % 17;
    match FEATURE_NAMES[column] {
        "blue" | "dual_sim" | "four_g" | "three_g" | "touch_screen" | "wifi" => (spread % 2) as f64,
        "battery_power" => 600.0 + spread as f64 * 80.0,
        "clock_speed"   => 0.5 + spread as f64 * 0.1,
        "m_dep"         => 0.1 + (spread % 10) as f64 * 0.1,
        "mobile_wt"     => 90.0 + spread as f64 * 6.0,
        "n_cores"       => 1.0 + (spread % 8) as f64,
        "px_height"     => 150.0 + spread as f64 * 90.0,
        "px_width"      => 600.0 + spread as f64 * 70.0,
        "sc_h"          => 5.0 + (spread % 15) as f64,
        "sc_w"          => (spread % 12) as f64,
        _               => 2.0 + spread as f64,
    }
}

fn ram_for(class: usize, row: usize) -> f64 {
    500.0 + 1000.0 * class as f64 + ((row * 37) % 200) as f64 - 100.0
}

/// `per_class` rows for each price range, interleaved. One `blue`
/// cell is left empty so the mode imputer has work to do.
pub fn synthetic_table(per_class: usize) -> Table {
    let rows = per_class * 4;
    let mut columns: Vec<(String, Vec<f64>)> = FEATURE_NAMES
        .iter()
        .enumerate()
        .map(|(c, name)| {
            let values = (0..rows)
                .map(|row| if *name == "ram" { ram_for(row % 4, row) } else { filler(c, row) })
                .collect();
            (name.to_string(), values)
        })
        .collect();
    columns[1].1[3] = f64::NAN;
    columns.push((LABEL_COLUMN.to_string(), (0..rows).map(|row| (row % 4) as f64).collect()));

    Table::from_columns(columns).unwrap()
}

pub fn write_synthetic_csv(path: &Path, per_class: usize) {
    write_csv(&synthetic_table(per_class), path).unwrap();
}

/// Training settings with every path inside `dir`, and enough
/// epochs for the small synthetic set to converge.
pub fn test_config(dir: &Path) -> TrainConfig {
    TrainConfig {
        data_path:    dir.join("data/train.csv").display().to_string(),
        cleaned_path: dir.join("data/processed/mobile_clean.csv").display().to_string(),
        model_path:   dir.join("models_ml/SVM_output.json").display().to_string(),
        epochs:       150,
        batch_size:   32,
        ..TrainConfig::default()
    }
}

/// A phone sitting in the middle of the given price range's RAM band
pub fn phone_in_range(class: usize) -> MobileFeatures {
    MobileFeatures {
        battery_power: 1200.0,
        blue:          1.0,
        clock_speed:   1.3,
        dual_sim:      0.0,
        fc:            10.0,
        four_g:        1.0,
        int_memory:    10.0,
        m_dep:         0.5,
        mobile_wt:     140.0,
        n_cores:       4.0,
        pc:            10.0,
        px_height:     900.0,
        px_width:      1200.0,
        ram:           500.0 + 1000.0 * class as f64,
        sc_h:          12.0,
        sc_w:          6.0,
        talk_time:     10.0,
        three_g:       1.0,
        touch_screen:  0.0,
        wifi:          1.0,
        price_range:   None,
    }
}

use colored::*;

use lanprobe_common::service::CATALOG;

use crate::terminal::{colors, print};

pub fn services(q_level: u8) {
    print::header("service catalog", q_level);

    let key_width: usize = CATALOG
        .iter()
        .map(|(port, _)| port.to_string().len() + "/tcp".len())
        .max()
        .unwrap_or(0);

    for (port, label) in CATALOG {
        let value: ColoredString = label.as_str().color(colors::SERVICE);
        print::aligned_line(&format!("{port}/tcp"), value, key_width);
    }
}

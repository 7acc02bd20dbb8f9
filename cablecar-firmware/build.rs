//! Build script for cablecar-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates run.toml at compile time with the firmware's own parser

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use cablecar_core::config::{parse_config, MAX_LABEL_LEN};
use cablecar_core::scheduler::DwellPlan;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Keys accepted in each section of run.toml
const SECTIONS: &[(&str, &[&str])] = &[
    ("device", &["version", "distance_unit", "tempo"]),
    ("platform", &["wait_ceiling_s"]),
    (
        "settle",
        &["cue_count", "cue_interval_s", "tone", "tone_length", "final_wait_s"],
    ),
    (
        "sampling",
        &[
            "dwell_s",
            "step_distance",
            "step_count",
            "speed",
            "direction",
            "sub_waits",
            "sub_wait_max_s",
        ],
    ),
];

/// Validate run.toml at compile time
fn validate_config() {
    // Re-run if run.toml changes
    println!("cargo:rerun-if-changed=run.toml");

    let config_path = Path::new("run.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: run.toml not found!                                      ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds its run from run.toml.                      ║\n\
            ║  Please create one in the cablecar-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read run.toml                                  ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in run.toml                          ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_layout(&config, &mut errors);
    report("Invalid run configuration", &errors);

    // Same parser and planner as the firmware, so a file that builds also runs
    let sampler = match parse_config(&config_content) {
        Ok(sampler) => sampler,
        Err(e) => {
            report("run.toml rejected by the firmware parser", &[e.to_string()]);
            return;
        }
    };
    if let Err(e) = DwellPlan::for_run(&sampler.run, &sampler.ceiling) {
        report("run.toml describes an infeasible run", &[e.to_string()]);
    }

    println!("cargo:warning=run.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Known sections and keys only; platform and sampling required
fn validate_layout(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        errors.push("run.toml must be a table".to_string());
        return;
    };

    for (name, value) in root {
        if name == "label" {
            match value.as_str() {
                Some(label) if label.len() <= MAX_LABEL_LEN => {}
                _ => errors.push(format!(
                    "'label' must be a string of at most {} bytes",
                    MAX_LABEL_LEN
                )),
            }
            continue;
        }

        let Some((_, keys)) = SECTIONS.iter().find(|(section, _)| *section == name.as_str()) else {
            errors.push(format!("unknown section or key '{}'", name));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
    }

    for required in ["platform", "sampling"] {
        if root.get(required).is_none() {
            errors.push(format!("missing [{}] section", required));
        }
    }
}

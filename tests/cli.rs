use assert_cmd::Command;
use tempfile::tempdir;

fn episim() -> Command {
    Command::cargo_bin("episim").unwrap()
}

#[test]
fn prints_a_daily_report() {
    let output = episim()
        .args(["--config", "tests/data/small_town.json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    // Days 0 through 10.
    assert_eq!(lines.len(), 11);
    // The seeded infections happen before the first report.
    assert!(lines[0].starts_with("at 0, un = 97, lat = 3,"));
    assert!(lines[10].starts_with("at 10, "));
    for line in lines {
        let total: usize = line
            .split(", ")
            .skip(1)
            .map(|field| field.split(" = ").nth(1).unwrap().parse::<usize>().unwrap())
            .sum();
        assert_eq!(total, 100, "{line}");
    }
}

#[test]
fn same_seed_same_report() {
    let run = |seed: &str| {
        episim()
            .args(["--config", "tests/data/small_town.json", "--random-seed", seed])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    assert_eq!(run("7"), run("7"));
}

#[test]
fn quiet_run_writes_csv() {
    let dir = tempdir().unwrap();
    let output_dir = dir.path().to_str().unwrap();
    episim()
        .args([
            "--config",
            "tests/data/small_town.json",
            "--quiet",
            "--output-dir",
            output_dir,
            "--prefix",
            "town_",
        ])
        .assert()
        .success()
        .stdout("");

    let path = dir.path().join("town_counts.csv");
    let contents = std::fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("time,uninfected,latent,infectious,bedridden,recovered,dead")
    );
    assert_eq!(lines.count(), 11);

    // Refuses to replace the report unless told to.
    episim()
        .args([
            "--config",
            "tests/data/small_town.json",
            "--quiet",
            "--output-dir",
            output_dir,
            "--prefix",
            "town_",
        ])
        .assert()
        .failure();
    episim()
        .args([
            "--config",
            "tests/data/small_town.json",
            "--quiet",
            "--output-dir",
            output_dir,
            "--prefix",
            "town_",
            "--force-overwrite",
        ])
        .assert()
        .success();
}

#[test]
fn invalid_parameters_fail() {
    let output = episim()
        .args(["--config", "tests/data/invalid_parameters.json"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).unwrap();
    assert!(stderr.contains("death_probability"), "{stderr}");
}

#[test]
fn log_level_option_is_accepted() {
    episim()
        .args([
            "--config",
            "tests/data/small_town.json",
            "--quiet",
            "--log-level",
            "info",
        ])
        .assert()
        .success();
}

#[test]
fn log_filter_option_logs_one_module() {
    let output = episim()
        .args([
            "--config",
            "tests/data/small_town.json",
            "--quiet",
            "--log-filter",
            "episim::runner=info",
        ])
        .assert()
        .success()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).unwrap();
    assert!(stderr.contains("simulation finished"), "{stderr}");
    assert!(!stderr.contains("episim::movement"), "{stderr}");

    episim()
        .args(["--quiet", "--log-filter", "episim::runner"])
        .assert()
        .failure();
}

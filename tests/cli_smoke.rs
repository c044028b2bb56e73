use std::path::PathBuf;
use std::process::Command;

#[test]
fn cli_renders_pgm_to_stdout() {
    let output = Command::new(env!("CARGO_BIN_EXE_mandelpix"))
        .args(["--width", "8", "--height", "8", "--iterations", "64"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let header = b"P5\n8 8\n63\n";
    assert!(output.stdout.starts_with(header));
    assert_eq!(output.stdout.len(), header.len() + 8 * 8);
}

#[test]
fn cli_writes_wide_pgm_file() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let out_path = dir.join("wide.pgm");
    let _ = std::fs::remove_file(&out_path);

    let status = Command::new(env!("CARGO_BIN_EXE_mandelpix"))
        .args(["--width", "16", "--height", "4", "--iterations", "300"])
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();
    assert!(status.success());

    let bytes = std::fs::read(&out_path).unwrap();
    let header = b"P5\n16 4\n299\n";
    assert!(bytes.starts_with(header));
    assert_eq!(bytes.len(), header.len() + 16 * 4 * 2);
}

#[test]
fn cli_reads_spec_file() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let spec_path = dir.join("spec.json");
    std::fs::write(
        &spec_path,
        r#"{ "width": 6, "height": 3, "iterations": 40, "xlim": [-2.5, 1.5], "ylim": [-1.5, 1.5] }"#,
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_mandelpix"))
        .arg("--spec")
        .arg(&spec_path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.starts_with(b"P5\n6 3\n39\n"));
}

#[test]
fn cli_rejects_out_of_range_iterations() {
    for bad in ["0", "65536"] {
        let output = Command::new(env!("CARGO_BIN_EXE_mandelpix"))
            .args(["--width", "4", "--height", "4", "--iterations", bad])
            .output()
            .unwrap();
        assert!(!output.status.success(), "iterations {bad} must be rejected");
    }
}

#[test]
fn cli_renders_are_deterministic() {
    let run = || {
        Command::new(env!("CARGO_BIN_EXE_mandelpix"))
            .args(["--width", "32", "--height", "16", "--iterations", "90"])
            .output()
            .unwrap()
    };
    let first = run();
    let second = run();
    assert!(first.status.success() && second.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn cli_accepts_forced_scalar_backend() {
    let output = Command::new(env!("CARGO_BIN_EXE_mandelpix"))
        .args([
            "--width", "8", "--height", "4", "--iterations", "32", "--backend", "scalar",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.starts_with(b"P5\n8 4\n31\n"));
}

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use ocr_pipeline_core::manifest::StackManifest;
use ocr_pipeline_core::storage_keys::upload_object_key;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the document OCR pipeline workspace",
    long_about = "A unified CLI for CI checks, Lambda packaging, and stack\n\
                  manifest tooling in the document OCR pipeline workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests, manifest validation)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build and package the Rust Lambda artifact as a bootstrap zip
    ServerlessPackage {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for binaries
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
    /// Validate the stack manifest, or write the default one
    Manifest {
        /// Manifest file path
        #[arg(long, default_value = DEFAULT_MANIFEST_PATH)]
        path: String,
        /// Overwrite the file with the built-in default stack
        #[arg(long)]
        write_default: bool,
    },
    /// Render the frontend config.json for a deployed API
    FrontendConfig {
        /// Base URL of the deployed API
        #[arg(long, env = "OCR_API_URL")]
        api_url: String,
        /// Manifest file path
        #[arg(long, default_value = DEFAULT_MANIFEST_PATH)]
        manifest: String,
        /// Output file path
        #[arg(long, default_value = "dist/frontend/config.json")]
        output: String,
    },
    /// Print the object key and fileKey request the frontend would use for an upload made now
    UploadKey {
        /// Local file name being uploaded
        file_name: String,
        /// Manifest file path
        #[arg(long, default_value = DEFAULT_MANIFEST_PATH)]
        manifest: String,
    },
}

const DEFAULT_MANIFEST_PATH: &str = "infra/stack.json";
const LAMBDA_PACKAGE: &str = "ocr_pipeline_lambda";
const LAMBDA_BINARY: &str = "ocr_runtime";

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Validate the checked-in stack manifest
    Manifest,
    /// Run check + manifest
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn load_manifest(path: &str) -> StackManifest {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|error| panic!("failed to read manifest '{path}': {error}"));
    let manifest = StackManifest::from_json(&text)
        .unwrap_or_else(|error| panic!("failed to parse manifest '{path}': {error}"));
    if let Err(error) = manifest.validate() {
        eprintln!("manifest '{path}' is invalid: {error}");
        exit(1);
    }
    manifest
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create output directory");
    }
    fs::write(path, contents)
        .unwrap_or_else(|error| panic!("failed to write '{}': {error}", path.display()));
}

// ── manifest ───────────────────────────────────────────────────────

fn manifest_command(path: &str, write_default: bool) {
    if write_default {
        let rendered = StackManifest::default()
            .to_json_pretty()
            .expect("default manifest should serialize");
        write_file(Path::new(path), &format!("{rendered}\n"));
        eprintln!("Wrote default stack manifest to {path}");
        return;
    }

    let manifest = load_manifest(path);
    eprintln!(
        "Manifest OK: uploads='{}' (public_write={}), frontend='{}' (public_read={}), timeout={}s",
        manifest.uploads.name,
        manifest.uploads.public_write,
        manifest.frontend.name,
        manifest.frontend.public_read,
        manifest.function.timeout_secs,
    );
    if manifest.uploads.public_write || manifest.frontend.public_read {
        eprintln!(
            "warning: stack grants anonymous access; set public_write/public_read to false to harden it"
        );
    }
}

fn frontend_config_command(api_url: &str, manifest_path: &str, output: &str) {
    let manifest = load_manifest(manifest_path);
    let config = manifest.frontend_config(api_url);
    let rendered =
        serde_json::to_string_pretty(&config).expect("frontend config should serialize");
    write_file(Path::new(output), &format!("{rendered}\n"));
    eprintln!("Wrote frontend config to {output}");
}

fn upload_key_command(file_name: &str, manifest_path: &str) {
    let manifest = load_manifest(manifest_path);
    let key = upload_object_key(Utc::now(), file_name);
    eprintln!("Upload target: s3://{}/{key}", manifest.uploads.name);
    println!("{}", file_key_query(&key));
}

/// Query string the frontend sends after uploading under `key`.
fn file_key_query(key: &str) -> String {
    format!("?fileKey={key}")
}

// ── packaging ──────────────────────────────────────────────────────

fn package_serverless_lambda(target: &str, profile: BuildProfile) {
    ensure_rust_target_installed(target);

    step("Build OCR lambda binary");

    let mut cargo_args = vec![
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--target",
        target,
        "--bin",
        LAMBDA_BINARY,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package lambda zip artifact");
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    let dist_dir = Path::new("dist/lambda");
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    package_lambda_zip(
        &target_dir.join(binary_name(LAMBDA_BINARY, target)),
        &dist_dir.join("ocr_runtime.zip"),
    );

    eprintln!(
        "\nPackaged artifact:\n- {}",
        dist_dir.join("ocr_runtime.zip").display()
    );
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "failed to list installed rust targets; run `rustup target list --installed` manually. details: {}",
            stderr.trim()
        );
    }

    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- serverless-package`"
        );
    }
}

fn binary_name(bin_name: &str, target: &str) -> String {
    if target.contains("windows") {
        format!("{bin_name}.exe")
    } else {
        bin_name.to_string()
    }
}

fn package_lambda_zip(binary_path: &Path, zip_path: &Path) {
    if !binary_path.exists() {
        panic!("expected lambda binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read lambda binary");
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry in lambda zip");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish lambda zip");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test ocr_pipeline_core");
    run_cargo(&["test", "-p", "ocr_pipeline_core"]);

    step("Test ocr_pipeline_lambda");
    run_cargo(&["test", "-p", LAMBDA_PACKAGE]);

    step("Test xtask");
    run_cargo(&["test", "-p", "xtask"]);
}

fn ci_manifest() {
    step("Validate stack manifest");
    manifest_command(DEFAULT_MANIFEST_PATH, false);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Manifest => ci_manifest(),
                CiJob::All => {
                    ci_check();
                    ci_manifest();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::ServerlessPackage { target, profile } => {
            package_serverless_lambda(&target, profile);
        }
        Commands::Manifest {
            path,
            write_default,
        } => {
            manifest_command(&path, write_default);
        }
        Commands::FrontendConfig {
            api_url,
            manifest,
            output,
        } => {
            frontend_config_command(&api_url, &manifest, &output);
        }
        Commands::UploadKey {
            file_name,
            manifest,
        } => {
            upload_key_command(&file_name, &manifest);
        }
    }
}

use std::fs;

use stegavid_core::api::{hide, unveil};
use stegavid_core::media::container::REENCODING_WARNING;
use stegavid_core::{CodecOptions, Metadata, Recovered, StegError};
use tempfile::tempdir;

const MIB: usize = 1024 * 1024;

#[test]
fn should_append_ten_bytes_to_a_mebibyte() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let carrier = temp_dir.path().join("movie.mp4");
    let secret = temp_dir.path().join("notes.txt");
    let output = temp_dir.path().join("movie-with-secret.mp4");
    let carrier_bytes = (0..MIB).map(|i| (i % 253) as u8).collect::<Vec<_>>();
    fs::write(&carrier, &carrier_bytes).unwrap();
    fs::write(&secret, b"0123456789").unwrap();

    let outcome = hide::prepare()
        .with_file(&secret)
        .with_carrier(&carrier)
        .with_output(&output)
        .with_options(CodecOptions::ContainerAppend)
        .execute()
        .expect("Failed to append file");
    assert_eq!(outcome.warnings, vec![REENCODING_WARNING.to_string()]);

    let metadata = Metadata::for_file(&secret, 10).unwrap().to_json().unwrap();
    let written = fs::read(&output).unwrap();
    assert_eq!(written.len(), MIB + 10 + metadata.len() + 4 + 16);
    assert_eq!(&written[..MIB], carrier_bytes.as_slice());
    assert!(written.ends_with(b"STEG_EOF_PAYLOAD"));

    let copy = temp_dir.path().join("copy.mp4");
    fs::copy(&output, &copy).unwrap();
    let outcome = unveil::prepare()
        .from_secret_file(&copy)
        .with_options(CodecOptions::ContainerAppend)
        .into_output_folder(temp_dir.path().join("recovered"))
        .execute()
        .expect("Failed to unveil appended file");

    let target = temp_dir.path().join("recovered").join("notes.txt");
    assert_eq!(outcome.recovered, Recovered::File(target.clone()));
    assert_eq!(fs::read(target).unwrap(), b"0123456789");
}

#[test]
fn should_not_find_a_truncated_marker() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let carrier = temp_dir.path().join("carrier.bin");
    let output = temp_dir.path().join("carrier-with-secret.bin");
    fs::write(&carrier, vec![1u8; 2048]).unwrap();

    hide::prepare()
        .with_message("short lived")
        .with_carrier(&carrier)
        .with_output(&output)
        .with_options(CodecOptions::ContainerAppend)
        .execute()
        .expect("Failed to append message");

    let mut written = fs::read(&output).unwrap();
    written.truncate(written.len() - 1);
    fs::write(&output, written).unwrap();

    let result = unveil::prepare()
        .from_secret_file(&output)
        .with_options(CodecOptions::ContainerAppend)
        .into_output_folder(temp_dir.path().join("recovered"))
        .execute();
    assert!(matches!(result, Err(StegError::MarkerNotFound)));
}

#[test]
fn should_fail_before_writing_anything_for_a_missing_payload_file() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let carrier = temp_dir.path().join("carrier.bin");
    let output = temp_dir.path().join("out.bin");
    fs::write(&carrier, b"carrier").unwrap();

    let result = hide::prepare()
        .with_file(temp_dir.path().join("does-not-exist.txt"))
        .with_carrier(&carrier)
        .with_output(&output)
        .with_options(CodecOptions::ContainerAppend)
        .execute();

    assert!(matches!(result, Err(StegError::ReadError { .. })));
    assert!(!output.exists());
}

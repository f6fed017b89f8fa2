mod common;

use std::cell::RefCell;
use std::fs;

use stegavid_core::api::{capacity, hide, unveil};
use stegavid_core::{CapacityUnit, CodecOptions, Recovered, StegError};
use tempfile::tempdir;

use common::write_frames;

#[test]
fn should_hide_and_unveil_a_file_in_a_frame_sequence() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let carrier = temp_dir.path().join("frames");
    let output = temp_dir.path().join("frames-with-secret");
    let secret = temp_dir.path().join("t.txt");
    write_frames(&carrier, 30, 64, 64);
    fs::write(&secret, b"ABCDE").unwrap();

    let report = capacity::prepare()
        .with_carrier(&carrier)
        .execute()
        .expect("Failed to compute capacity");
    assert_eq!(report.capacity, 29660);
    assert_eq!(report.unit, CapacityUnit::Bytes);

    let outcome = hide::prepare()
        .with_file(&secret)
        .with_carrier(&carrier)
        .with_output(&output)
        .execute()
        .expect("Failed to hide file in frames");
    assert_eq!(outcome.output, output);
    assert_eq!(fs::read_dir(&output).unwrap().count(), 30);

    let outcome = unveil::prepare()
        .from_secret_file(&output)
        .into_output_folder(temp_dir.path().join("recovered"))
        .execute()
        .expect("Failed to unveil file from frames");

    let metadata = outcome.metadata.expect("metadata of the hidden file");
    assert_eq!(metadata.filename, "t.txt");
    assert_eq!(metadata.size, 5);
    assert_eq!(
        outcome.recovered,
        Recovered::File(temp_dir.path().join("recovered").join("t.txt"))
    );
    assert_eq!(
        fs::read(temp_dir.path().join("recovered").join("t.txt")).unwrap(),
        b"ABCDE"
    );
}

#[test]
fn should_only_touch_the_least_significant_bits() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let carrier = temp_dir.path().join("frames");
    let output = temp_dir.path().join("out");
    write_frames(&carrier, 20, 32, 32);

    hide::prepare()
        .with_message("a message wrapped into a file")
        .with_carrier(&carrier)
        .with_output(&output)
        .with_options(CodecOptions::FrameLsb(Default::default()))
        .execute()
        .expect("Failed to hide message in frames");

    let mut originals = fs::read_dir(&carrier)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect::<Vec<_>>();
    originals.sort();
    let mut written = fs::read_dir(&output)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect::<Vec<_>>();
    written.sort();

    for (original, written) in originals.iter().zip(written.iter()) {
        let a = image::open(original).unwrap().to_rgb8();
        let b = image::open(written).unwrap().to_rgb8();
        assert!(a
            .as_raw()
            .iter()
            .zip(b.as_raw().iter())
            .all(|(x, y)| x >> 1 == y >> 1));
    }
}

#[test]
fn should_respect_the_capacity_boundary() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let carrier = temp_dir.path().join("frames");
    write_frames(&carrier, 30, 64, 64);

    let fits = temp_dir.path().join("fits.bin");
    fs::write(&fits, vec![0xa5u8; 29660]).unwrap();
    hide::prepare()
        .with_file(&fits)
        .with_carrier(&carrier)
        .with_output(temp_dir.path().join("exact"))
        .execute()
        .expect("A payload of exactly the capacity has to fit");

    let too_big = temp_dir.path().join("too-big.bin");
    fs::write(&too_big, vec![0xa5u8; 29661]).unwrap();
    let result = hide::prepare()
        .with_file(&too_big)
        .with_carrier(&carrier)
        .with_output(temp_dir.path().join("overflow"))
        .execute();

    assert!(matches!(
        result,
        Err(StegError::CapacityExceeded {
            needed: 29661,
            available: 29660
        })
    ));
    assert!(!temp_dir.path().join("overflow").exists());
}

#[test]
fn should_round_trip_an_encrypted_text() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let carrier = temp_dir.path().join("frames");
    let output = temp_dir.path().join("secret-frames");
    write_frames(&carrier, 10, 48, 48);

    hide::prepare()
        .with_message("Meet me at the old bridge, 23:00")
        .with_password("Secret42")
        .with_carrier(&carrier)
        .with_output(&output)
        .with_options(CodecOptions::text_lsb())
        .execute()
        .expect("Failed to hide text");

    let outcome = unveil::prepare()
        .from_secret_file(&output)
        .using_password("Secret42")
        .with_options(CodecOptions::text_lsb())
        .execute()
        .expect("Failed to unveil text");
    assert_eq!(
        outcome.recovered,
        Recovered::Text("Meet me at the old bridge, 23:00".to_string())
    );

    let wrong = unveil::prepare()
        .from_secret_file(&output)
        .using_password("secret42")
        .with_options(CodecOptions::text_lsb())
        .execute();
    assert!(matches!(wrong, Err(StegError::DecryptionFailed)));
}

#[test]
fn should_report_a_clean_carrier() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let carrier = temp_dir.path().join("frames");
    write_frames(&carrier, 5, 32, 32);

    let result = unveil::prepare()
        .from_secret_file(&carrier)
        .into_output_folder(temp_dir.path().join("recovered"))
        .execute();

    assert!(matches!(result, Err(StegError::MarkerNotFound)));
    assert!(!temp_dir.path().join("recovered").exists());
}

#[test]
fn should_refuse_a_non_empty_output_directory() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let carrier = temp_dir.path().join("frames");
    let output = temp_dir.path().join("occupied");
    write_frames(&carrier, 20, 32, 32);
    fs::create_dir(&output).unwrap();
    fs::write(output.join("keep.txt"), b"keep me").unwrap();

    let result = hide::prepare()
        .with_message("hello")
        .with_carrier(&carrier)
        .with_output(&output)
        .execute();

    assert!(matches!(result, Err(StegError::WriteError { .. })));
    assert_eq!(fs::read(output.join("keep.txt")).unwrap(), b"keep me");
}

#[test]
fn should_report_monotonic_progress() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let carrier = temp_dir.path().join("frames");
    write_frames(&carrier, 20, 32, 32);
    let seen = RefCell::new(Vec::new());

    hide::prepare()
        .with_message("progress")
        .with_carrier(&carrier)
        .with_output(temp_dir.path().join("out"))
        .with_progress(|percent: u8| seen.borrow_mut().push(percent))
        .execute()
        .expect("Failed to hide message");

    let seen = seen.into_inner();
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(seen.last(), Some(&100));
}

#[test]
fn should_stop_when_interrupted() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let carrier = temp_dir.path().join("frames");
    let output = temp_dir.path().join("out");
    write_frames(&carrier, 20, 32, 32);

    let result = hide::prepare()
        .with_message("never written")
        .with_carrier(&carrier)
        .with_output(&output)
        .with_interrupt(|| true)
        .execute();

    assert!(matches!(result, Err(StegError::Interrupted)));
    assert!(!output.exists());
}

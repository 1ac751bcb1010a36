//! End-to-end reads of synthetic track files

mod common;

use common::*;
use imf_core::Rational;
use imf_mxf::ul::labels;
use imf_mxf::{
    default_registry, ErrorKind, ErrorLogger, FileByteRangeProvider, HeaderPartitionImf, HeaderPartitionOp1a,
    MemoryByteRangeProvider, MxfError, MxfEssenceReader, PartitionPack, PartitionStatus, ReaderConfig,
    Rule, Severity,
};
use std::io::Write;
use std::sync::Arc;

fn reader(options: &TrackFileOptions) -> MxfEssenceReader<MemoryByteRangeProvider> {
    let provider = MemoryByteRangeProvider::new(track_file(options));
    MxfEssenceReader::new(provider, ReaderConfig::default()).unwrap()
}

fn rules(err: &MxfError) -> Vec<Rule> {
    match err {
        MxfError::Compliance(violations) => violations.iter().map(|v| v.rule).collect(),
        other => panic!("expected compliance violations, got {:?}", other),
    }
}

#[test]
fn test_read_valid_track_file() {
    let reader = reader(&TrackFileOptions::default());
    let track_file = reader.read().unwrap();

    assert!(reader.logger().is_empty());
    assert_eq!(track_file.partitions.len(), 3);
    assert_eq!(track_file.random_index_pack.entries.len(), 3);
    assert_eq!(track_file.track_file_id, Some(TRACK_FILE_ID));
    assert_eq!(track_file.edit_rate, Some(Rational::new(24, 1)));

    assert_eq!(track_file.essence_descriptors.len(), 1);
    let xml = &track_file.essence_descriptors[0];
    assert!(xml.starts_with("<RGBADescriptor xmlns=\"http://www.smpte-ra.org/reg/395/2014/13/1-aaf\">"));
    assert!(xml.contains("<SampleRate>24/1</SampleRate>"));
    assert!(xml.contains("<StoredWidth>1920</StoredWidth>"));
    assert!(xml.contains("<JPEG2000SubDescriptor>"));
    assert!(xml.contains("<Xsiz>1920</Xsiz>"));
    assert!(xml.contains(&format!("urn:uuid:{}", DESCRIPTOR)));
    assert!(!xml.contains("UnknownProperty"));

    // sub-descriptor nests inside the SubDescriptors element
    let subs = xml.find("<SubDescriptors>").unwrap();
    let j2k = xml.find("<JPEG2000SubDescriptor>").unwrap();
    assert!(subs < j2k);
}

#[test]
fn test_missing_index_stops_after_one_error() {
    let options = TrackFileOptions {
        write_rip: false,
        ..Default::default()
    };
    let provider = CountingProvider::new(track_file(&options));
    let reader = MxfEssenceReader::new(provider, ReaderConfig::default()).unwrap();

    let err = reader.read().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingIndex);

    let errors = reader.logger().errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::MissingIndex);
    assert_eq!(errors[0].severity, Severity::Fatal);
    assert_eq!(errors[0].to_string().split(':').next(), Some("Fatal MissingIndexError"));

    // only the trailing length field was read
    assert_eq!(reader.provider().fetches(), 1);
}

#[test]
fn test_header_metadata_read_without_header_essence() {
    const ESSENCE: usize = 4 * 1024 * 1024;

    for declare_header_byte_count in [true, false] {
        let options = TrackFileOptions {
            header_essence: ESSENCE,
            declare_header_byte_count,
            ..Default::default()
        };
        let provider = CountingProvider::new(track_file(&options));
        let reader = MxfEssenceReader::new(provider, ReaderConfig::default()).unwrap();

        let descriptors = reader.essence_descriptors().unwrap();
        assert_eq!(descriptors.len(), 1);
        assert!(descriptors[0].contains("<StoredWidth>1920</StoredWidth>"));
        assert!(
            reader.provider().largest_fetch() < 64 * 1024,
            "largest range {} with declare_header_byte_count = {}",
            reader.provider().largest_fetch(),
            declare_header_byte_count
        );
    }
}

#[test]
fn test_partition_pack_read_fetches_twice() {
    let provider = CountingProvider::new(track_file(&TrackFileOptions::default()));
    let pack = PartitionPack::read(&provider, 0).unwrap();
    assert_eq!(pack.status, PartitionStatus::ClosedComplete);
    assert_eq!(provider.fetches(), 2);
}

#[test]
fn test_dangling_reference_is_fatal() {
    let options = TrackFileOptions {
        dangling_sub_descriptor: true,
        ..Default::default()
    };
    let reader = reader(&options);

    match reader.read() {
        Err(MxfError::DanglingReference {
            source_uid,
            target_uid,
            offset,
        }) => {
            assert_eq!(source_uid, DESCRIPTOR);
            assert_eq!(target_uid, MISSING);
            assert!(offset > 0);
        }
        other => panic!("expected dangling reference, got {:?}", other),
    }

    let errors = reader.logger().errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::DanglingReference);
    assert_eq!(errors[0].location.object_uid, Some(DESCRIPTOR));
    assert!(errors[0].location.byte_offset.is_some());
}

#[test]
fn test_op1a_violations_are_collected() {
    let mut op = labels::OP1A;
    op[12] = 0x02;
    let options = TrackFileOptions {
        header_status: PartitionStatus::OpenIncomplete,
        second_material_package: true,
        operational_pattern: op,
        ..Default::default()
    };
    let reader = reader(&options);

    let err = reader.read().unwrap_err();
    let rules = rules(&err);
    assert!(rules.contains(&Rule::Op1aHeaderClosedComplete));
    assert!(rules.contains(&Rule::Op1aMaterialPackageCount));
    assert!(rules.contains(&Rule::Op1aOperationalPattern));
    // IMF rules never run on a file that fails OP1A
    assert!(rules.iter().all(|r| r.is_op1a()));

    let errors = reader.logger().errors();
    assert_eq!(errors.len(), rules.len());
    assert!(errors.iter().all(|e| e.severity == Severity::NonFatal));
    assert!(errors.iter().all(|e| e.kind == ErrorKind::ComplianceViolation));
    assert!(!reader.logger().has_fatal_errors());
}

#[test]
fn test_imf_violations_are_collected() {
    let options = TrackFileOptions {
        header_body_sid: 1,
        sample_rate: Some((25, 1)),
        ..Default::default()
    };
    let reader = reader(&options);

    let err = reader.read().unwrap_err();
    let rules = rules(&err);
    assert_eq!(rules.len(), 2);
    assert!(rules.contains(&Rule::ImfHeaderEssence));
    assert!(rules.contains(&Rule::ImfEditRate));

    let errors = reader.logger().errors();
    assert_eq!(errors.len(), 2);
    let edit_rate = errors
        .iter()
        .find(|e| e.location.rule == Some(Rule::ImfEditRate))
        .unwrap();
    assert_eq!(edit_rate.location.object_uid, Some(DESCRIPTOR));
}

#[test]
fn test_missing_sample_rate() {
    let options = TrackFileOptions {
        sample_rate: None,
        ..Default::default()
    };
    let err = reader(&options).read().unwrap_err();
    assert_eq!(rules(&err), vec![Rule::ImfDescriptorFields]);
}

#[test]
fn test_imf_pass_can_be_disabled() {
    let options = TrackFileOptions {
        header_body_sid: 1,
        sample_rate: Some((25, 1)),
        ..Default::default()
    };
    let provider = MemoryByteRangeProvider::new(track_file(&options));
    let config = ReaderConfig::default().with_imf_validation(false);
    let reader = MxfEssenceReader::new(provider, config).unwrap();

    let track_file = reader.read().unwrap();
    assert_eq!(track_file.edit_rate, None);
    assert!(reader.logger().is_empty());
}

#[test]
fn test_resource_edit_rates() {
    let track_file = reader(&TrackFileOptions::default()).read().unwrap();
    let logger = ErrorLogger::new();
    let op1a = HeaderPartitionOp1a::validate(&track_file.header, None, &logger).unwrap();
    let imf = HeaderPartitionImf::validate(op1a, &logger).unwrap();
    assert_eq!(imf.track_file_id(), Some(TRACK_FILE_ID));
    assert_eq!(imf.essence_descriptor().instance_uid, DESCRIPTOR);

    imf.check_resource_edit_rates(&[Rational::new(24, 1), Rational::new(48, 2)], &logger)
        .unwrap();
    let err = imf
        .check_resource_edit_rates(&[Rational::new(24, 1), Rational::new(25, 1)], &logger)
        .unwrap_err();
    assert_eq!(rules(&err), vec![Rule::ImfEditRate]);
    assert_eq!(logger.len(), 1);
}

#[test]
fn test_footer_metadata_matches_header() {
    let options = TrackFileOptions {
        footer_metadata: true,
        ..Default::default()
    };
    let reader = reader(&options);
    let track_file = reader.read().unwrap();
    assert!(track_file.partitions[2].has_header_metadata());
    assert!(reader.logger().is_empty());
}

#[test]
fn test_projection_is_deterministic() {
    let bytes: Arc<[u8]> = track_file(&TrackFileOptions {
        unknown_property: true,
        ..Default::default()
    })
    .into();

    let first = MxfEssenceReader::new(MemoryByteRangeProvider::new(bytes.clone()), ReaderConfig::default())
        .unwrap()
        .essence_descriptors()
        .unwrap();
    let second = MxfEssenceReader::new(MemoryByteRangeProvider::new(bytes), ReaderConfig::default())
        .unwrap()
        .essence_descriptors()
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unknown_property_lenient_and_strict() {
    let bytes = track_file(&TrackFileOptions {
        unknown_property: true,
        ..Default::default()
    });

    let lenient = MxfEssenceReader::new(
        MemoryByteRangeProvider::new(bytes.clone()),
        ReaderConfig::default(),
    )
    .unwrap();
    let xml = &lenient.read().unwrap().essence_descriptors[0];
    assert!(xml.contains(&format!("tag=\"{:04x}\"", UNMAPPED_TAG)));
    assert!(xml.contains("cafe"));

    let strict = MxfEssenceReader::new(
        MemoryByteRangeProvider::new(bytes),
        ReaderConfig::default().with_strict_registry(true),
    )
    .unwrap();
    let err = strict.read().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownRegistryEntry);
    assert_eq!(strict.logger().len(), 1);
    assert!(strict.logger().has_fatal_errors());
}

#[test]
fn test_concurrent_readers() {
    let bytes: Arc<[u8]> = track_file(&TrackFileOptions::default()).into();
    let shared = ErrorLogger::new();

    let results: Vec<Vec<String>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let bytes = bytes.clone();
                let logger = shared.clone();
                scope.spawn(move || {
                    let reader = MxfEssenceReader::new(
                        MemoryByteRangeProvider::new(bytes),
                        ReaderConfig::default(),
                    )
                    .unwrap()
                    .with_logger(logger);
                    reader.read().unwrap().essence_descriptors
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.len(), 4);
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert!(shared.is_empty());
}

#[test]
fn test_file_provider_with_staging() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("picture.mxf");
    let staging = dir.path().join("staging");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(&track_file(&TrackFileOptions::default()))
        .unwrap();

    let config = ReaderConfig::default()
        .with_working_directory(&staging)
        .with_staging_threshold(64);
    let provider = FileByteRangeProvider::with_config(&path, &config).unwrap();
    let reader = MxfEssenceReader::new(provider, config).unwrap();

    let track_file = reader.read().unwrap();
    assert_eq!(track_file.track_file_id, Some(TRACK_FILE_ID));
    // staged ranges are gone once dropped
    assert_eq!(std::fs::read_dir(&staging).unwrap().count(), 0);
}

#[test]
fn test_registry_loaded_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.json");
    std::fs::write(&path, serde_json::to_string(default_registry()).unwrap()).unwrap();

    let bytes = track_file(&TrackFileOptions::default());
    let config = ReaderConfig::default().with_registry_path(&path);
    let external = MxfEssenceReader::new(MemoryByteRangeProvider::new(bytes.clone()), config)
        .unwrap()
        .essence_descriptors()
        .unwrap();
    let built_in = MxfEssenceReader::new(MemoryByteRangeProvider::new(bytes), ReaderConfig::default())
        .unwrap()
        .essence_descriptors()
        .unwrap();
    assert_eq!(external, built_in);

    let missing = ReaderConfig::default().with_registry_path(dir.path().join("absent.json"));
    let err = MxfEssenceReader::new(MemoryByteRangeProvider::new(Vec::new()), missing).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Registry);
}

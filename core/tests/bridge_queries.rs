// Bridge query tests against a fake gateway returning canned buffers.
//
// These exercise the full query surface end to end: the scoped
// acquire/use/release discipline, the two-phase size-then-fill buffer
// protocol, legacy and UTF-16 decoding, and the degradation to neutral
// results when the subsystem has no context or no data.

use std::cell::{Cell, RefCell};

use libimm_core::{
    AssociationFlags, CandidateList, CompositionQuery, Config, ContextHandle, DecodeError,
    ImeBridge, ImmError, ImmGateway, LayoutHandle, LegacyEncoding, StringKind, WindowHandle,
    CANDIDATE_HEADER_LEN,
};

const WINDOW: WindowHandle = WindowHandle(42);
const CONTEXT: ContextHandle = ContextHandle(7);

/// Canned-buffer gateway. Tracks acquisitions, releases, and association
/// calls so tests can assert the resource discipline.
#[derive(Default)]
struct FakeGateway {
    context: ContextHandle,
    composition: Vec<u8>,
    result: Vec<u8>,
    clause_buf: Vec<u8>,
    cursor: i32,
    candidate_buf: Vec<u8>,
    conversion: Option<(u32, u32)>,
    open: i32,
    description: Vec<u8>,
    acquires: Cell<u32>,
    releases: Cell<u32>,
    associations: RefCell<Vec<(ContextHandle, AssociationFlags)>>,
}

impl FakeGateway {
    fn with_context() -> Self {
        Self {
            context: CONTEXT,
            ..Self::default()
        }
    }

    fn balanced(&self) -> bool {
        self.acquires.get() == self.releases.get()
    }
}

fn serve(data: &[u8], buf: Option<&mut [u8]>) -> i32 {
    match buf {
        None => data.len() as i32,
        Some(buf) => {
            let n = data.len().min(buf.len());
            buf[..n].copy_from_slice(&data[..n]);
            n as i32
        }
    }
}

impl ImmGateway for FakeGateway {
    fn acquire_context(&self, window: WindowHandle) -> ContextHandle {
        assert_eq!(window, WINDOW);
        self.acquires.set(self.acquires.get() + 1);
        self.context
    }

    fn release_context(&self, window: WindowHandle, context: ContextHandle) {
        assert_eq!(window, WINDOW);
        assert_eq!(context, self.context);
        self.releases.set(self.releases.get() + 1);
    }

    fn composition_data(
        &self,
        context: ContextHandle,
        query: CompositionQuery,
        buf: Option<&mut [u8]>,
    ) -> i32 {
        assert_eq!(context, self.context);
        match query {
            CompositionQuery::CompositionString => serve(&self.composition, buf),
            CompositionQuery::ResultString => serve(&self.result, buf),
            CompositionQuery::CompositionClauses => serve(&self.clause_buf, buf),
            CompositionQuery::CursorPos => self.cursor,
            CompositionQuery::CompositionReading | CompositionQuery::ResultReading => 0,
        }
    }

    fn candidate_data(
        &self,
        context: ContextHandle,
        list_index: u32,
        buf: Option<&mut [u8]>,
    ) -> i32 {
        assert_eq!(context, self.context);
        assert_eq!(list_index, 0);
        serve(&self.candidate_buf, buf)
    }

    fn conversion_status(&self, _context: ContextHandle) -> Option<(u32, u32)> {
        self.conversion
    }

    fn open_status(&self, _context: ContextHandle) -> i32 {
        self.open
    }

    fn keyboard_layout(&self) -> LayoutHandle {
        LayoutHandle(11)
    }

    fn description_data(&self, layout: LayoutHandle, buf: Option<&mut [u8]>) -> u32 {
        assert_eq!(layout, LayoutHandle(11));
        serve(&self.description, buf) as u32
    }

    fn associate_context(
        &self,
        window: WindowHandle,
        context: ContextHandle,
        flags: AssociationFlags,
    ) -> bool {
        assert_eq!(window, WINDOW);
        self.associations.borrow_mut().push((context, flags));
        true
    }
}

fn clause_buf(offsets: &[u32]) -> Vec<u8> {
    offsets.iter().flat_map(|o| o.to_le_bytes()).collect()
}

fn candidate_buf(selection: u32, page_start: u32, page_size: u32, entries: &[&[u8]]) -> Vec<u8> {
    let count = entries.len() as u32;
    let mut strings = Vec::new();
    let mut offsets = Vec::new();
    let table_start = CANDIDATE_HEADER_LEN as u32 + count * 4;
    for entry in entries {
        offsets.push(table_start + strings.len() as u32);
        strings.extend_from_slice(entry);
        strings.push(0);
    }
    let total = table_start + strings.len() as u32;

    let mut buf = Vec::new();
    for word in [total, 0, count, selection, page_start, page_size] {
        buf.extend_from_slice(&word.to_le_bytes());
    }
    for offset in offsets {
        buf.extend_from_slice(&offset.to_le_bytes());
    }
    buf.extend_from_slice(&strings);
    buf
}

#[test]
fn composition_and_result_strings() {
    let enc = LegacyEncoding::default();
    let gateway = FakeGateway {
        composition: enc.encode("かんじ"),
        result: enc.encode("漢字"),
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);

    assert_eq!(bridge.composition(), "かんじ");
    assert_eq!(bridge.result(), "漢字");
    assert_eq!(bridge.string(StringKind::CompositionReading), "");
    assert!(bridge.gateway().balanced());
}

#[test]
fn clause_fixture_two_single_byte_clauses() {
    let gateway = FakeGateway {
        composition: b"ab".to_vec(),
        clause_buf: clause_buf(&[0, 1, 2]),
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);

    assert_eq!(bridge.clauses().unwrap(), vec!["a".to_string(), "b".to_string()]);
    assert!(bridge.gateway().balanced());
}

#[test]
fn clauses_concatenate_to_composition() {
    let enc = LegacyEncoding::default();
    let gateway = FakeGateway {
        composition: enc.encode("きょうは晴れ"),
        // "きょうは" = 8 bytes, "晴れ" = 4 bytes
        clause_buf: clause_buf(&[0, 8, 12]),
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);

    let clauses = bridge.clauses().unwrap();
    assert_eq!(clauses, vec!["きょうは".to_string(), "晴れ".to_string()]);
    assert_eq!(clauses.concat(), bridge.composition());
}

#[test]
fn malformed_clause_buffer_is_a_decode_error() {
    let gateway = FakeGateway {
        composition: b"ab".to_vec(),
        clause_buf: vec![0, 0, 0], // not a multiple of 4
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);

    assert_eq!(
        bridge.clauses().unwrap_err(),
        DecodeError::MisalignedClauseBuffer { len: 3 }
    );
    // The context is released even on the error path.
    assert!(bridge.gateway().balanced());
}

#[test]
fn cursor_sentinel_maps_to_none() {
    let gateway = FakeGateway {
        composition: b"abc".to_vec(),
        cursor: 0xFFFF,
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);
    assert_eq!(bridge.cursor(), None);
}

#[test]
fn cursor_at_byte_end_equals_char_count() {
    let enc = LegacyEncoding::default();
    let composition = enc.encode("かんじ"); // 6 bytes, 3 chars
    let gateway = FakeGateway {
        cursor: composition.len() as i32,
        composition,
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);
    assert_eq!(bridge.cursor(), Some(3));
}

#[test]
fn cursor_mid_composition_is_a_char_index() {
    let enc = LegacyEncoding::default();
    let gateway = FakeGateway {
        composition: enc.encode("かんじ"),
        cursor: 4,
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);
    assert_eq!(bridge.cursor(), Some(2));
}

#[test]
fn candidate_fixture_preserves_header() {
    let gateway = FakeGateway {
        candidate_buf: candidate_buf(1, 0, 9, &[b"A", b"BB", b"CCC"]),
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);

    let list = bridge.candidates().unwrap();
    assert_eq!(list.iter().collect::<Vec<_>>(), vec!["A", "BB", "CCC"]);
    assert_eq!(list.selection(), 1);
    assert_eq!(list.page_start(), 0);
    assert_eq!(list.page_size(), 9);
    assert!(bridge.gateway().balanced());
}

#[test]
fn no_candidate_data_yields_empty_list() {
    let gateway = FakeGateway::with_context();
    let bridge = ImeBridge::new(gateway, WINDOW);
    assert_eq!(bridge.candidates().unwrap(), CandidateList::empty());
}

#[test]
fn truncated_candidate_buffer_is_a_decode_error() {
    let gateway = FakeGateway {
        candidate_buf: vec![1, 2, 3, 4],
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);

    assert!(matches!(
        bridge.candidates().unwrap_err(),
        DecodeError::TruncatedHeader { len: 4, .. }
    ));
    assert!(bridge.gateway().balanced());
}

#[test]
fn open_status_and_conversion_mode() {
    use libimm_core::ConversionMode;

    let gateway = FakeGateway {
        open: 1,
        conversion: Some((0x0003, 0x0001)),
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);

    assert!(bridge.open_status());
    // Only the conversion word is exposed; the sentence word is dropped.
    assert_eq!(
        bridge.conversion_mode(),
        ConversionMode::NATIVE | ConversionMode::KATAKANA
    );
}

#[test]
fn description_is_utf16() {
    let description: Vec<u8> = "Microsoft IME"
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect();
    let gateway = FakeGateway {
        description,
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);
    assert_eq!(bridge.description(), "Microsoft IME");
}

#[test]
fn null_context_degrades_to_neutral_results() {
    // Gateway refuses to hand out a context: the host sees "no IME state".
    let gateway = FakeGateway {
        composition: b"never served".to_vec(),
        open: 1,
        ..FakeGateway::default()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);

    assert_eq!(bridge.composition(), "");
    assert_eq!(bridge.result(), "");
    assert_eq!(bridge.clauses().unwrap(), Vec::<String>::new());
    assert_eq!(bridge.cursor(), None);
    assert_eq!(bridge.candidates().unwrap(), CandidateList::empty());
    assert!(!bridge.open_status());
    assert!(bridge.conversion_mode().is_alphanumeric());

    // Failed acquisitions perform no release.
    assert_eq!(bridge.gateway().acquires.get(), 7);
    assert_eq!(bridge.gateway().releases.get(), 0);
}

#[test]
fn with_context_reports_failed_acquisition() {
    let bridge = ImeBridge::new(FakeGateway::default(), WINDOW);
    let outcome = bridge.with_context(|_, _| ());
    assert!(matches!(outcome, Err(ImmError::NoContext)));
}

#[test]
fn each_query_acquires_and_releases_once() {
    let gateway = FakeGateway {
        composition: b"abc".to_vec(),
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);

    bridge.composition();
    bridge.result();
    bridge.cursor();
    bridge.open_status();

    assert_eq!(bridge.gateway().acquires.get(), 4);
    assert_eq!(bridge.gateway().releases.get(), 4);
}

#[test]
fn snapshot_assembles_all_pieces_under_one_acquisition() {
    let enc = LegacyEncoding::default();
    let composition = enc.encode("かんじ");
    let gateway = FakeGateway {
        cursor: composition.len() as i32,
        clause_buf: clause_buf(&[0, 4, 6]),
        composition,
        result: enc.encode("済"),
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::new(gateway, WINDOW);

    let snapshot = bridge.composition_snapshot().unwrap();
    assert_eq!(snapshot.text, "かんじ");
    assert_eq!(snapshot.result, "済");
    assert_eq!(snapshot.clauses, vec!["かん".to_string(), "じ".to_string()]);
    assert_eq!(snapshot.clauses.concat(), snapshot.text);
    assert_eq!(snapshot.cursor, Some(3));

    assert_eq!(bridge.gateway().acquires.get(), 1);
    assert_eq!(bridge.gateway().releases.get(), 1);
}

#[test]
fn association_mutators_use_the_documented_flags() {
    let gateway = FakeGateway::with_context();
    let bridge = ImeBridge::new(gateway, WINDOW);

    assert!(bridge.associate_context(ContextHandle(5)));
    assert!(bridge.associate_default_context());

    assert_eq!(
        bridge.gateway().associations.borrow().as_slice(),
        &[
            (ContextHandle(5), AssociationFlags::empty()),
            (ContextHandle::NULL, AssociationFlags::DEFAULT),
        ]
    );
}

#[test]
fn config_selects_the_legacy_code_page() {
    let config = Config {
        legacy_encoding: "euc-kr".to_string(),
        ..Config::default()
    };
    // "한글" in EUC-KR
    let gateway = FakeGateway {
        composition: vec![0xC7, 0xD1, 0xB1, 0xDB],
        ..FakeGateway::with_context()
    };
    let bridge = ImeBridge::with_config(gateway, WINDOW, &config).unwrap();
    assert_eq!(bridge.composition(), "한글");
}

#[test]
fn unknown_encoding_label_is_rejected() {
    let config = Config {
        legacy_encoding: "klingon".to_string(),
        ..Config::default()
    };
    let outcome = ImeBridge::with_config(FakeGateway::default(), WINDOW, &config);
    assert!(matches!(outcome, Err(ImmError::UnknownEncoding(label)) if label == "klingon"));
}

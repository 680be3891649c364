#![no_main]

use arbitrary::Arbitrary;
use fbxbin::{document_to_bytes, document_to_text, from_bytes, EncodeOptions, Mode};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum FuzzMode {
    Strict,
    Lenient,
}

impl From<FuzzMode> for Mode {
    fn from(m: FuzzMode) -> Self {
        match m {
            FuzzMode::Strict => Mode::Strict,
            FuzzMode::Lenient => Mode::Lenient,
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    data: Vec<u8>,
    mode: FuzzMode,
}

fuzz_target!(|input: FuzzInput| {
    let mode: Mode = input.mode.into();

    // Декодер не должен паниковать ни на каких данных.
    let Ok(doc) = from_bytes(&input.data, mode) else {
        return;
    };

    let _ = document_to_text(&doc);

    // Всё, что прочитано строго, должно записываться и читаться обратно.
    if mode.is_strict() {
        let bytes = document_to_bytes(&doc, &EncodeOptions::default())
            .expect("decoded tree must encode");
        let again = from_bytes(&bytes, Mode::Strict).expect("re-encoded tree must decode");
        assert!(again.root.node_count() <= doc.root.node_count());
    }
});

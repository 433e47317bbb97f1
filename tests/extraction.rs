use lingo_lens::{ParsedFields, ResponseParser};

fn parse(input: &str) -> ParsedFields {
    ResponseParser::new().parse(input)
}

#[test]
fn well_formed_numbered_reply() {
    let fields = parse("1. Text: Hello\n2. Pronunciation: /həˈloʊ/\n3. Translation: Xin chào");
    assert_eq!(fields.text, "Hello");
    assert_eq!(fields.pronunciation, "/həˈloʊ/");
    assert_eq!(fields.translation, "Xin chào");
}

#[test]
fn labeled_reply_without_ordinals() {
    let fields =
        parse("Text: Good morning\nPronunciation: /ɡʊd ˈmɔːrnɪŋ/\nTranslation: Chào buổi sáng");
    assert_eq!(fields.text, "Good morning");
    assert_eq!(fields.pronunciation, "/ɡʊd ˈmɔːrnɪŋ/");
    assert_eq!(fields.translation, "Chào buổi sáng");
}

#[test]
fn bare_lines_use_the_phonetic_heuristic() {
    let fields = parse("Bonjour\n/bɔ̃.ʒuːʁ/\nXin chào");
    assert_eq!(fields.text, "Bonjour");
    assert_eq!(fields.pronunciation, "/bɔ̃.ʒuːʁ/");
    assert_eq!(fields.translation, "Xin chào");
}

#[test]
fn unstructured_reply_becomes_text_only() {
    let fields = parse("just some unrelated unstructured sentence");
    assert_eq!(fields.text, "just some unrelated unstructured sentence");
    assert_eq!(fields.pronunciation, "");
    assert_eq!(fields.translation, "");
}

#[test]
fn empty_reply_yields_an_empty_record() {
    let fields = parse("");
    assert_eq!(
        fields,
        ParsedFields {
            text: String::new(),
            pronunciation: String::new(),
            translation: String::new(),
        }
    );
}

#[test]
fn fields_serialize_under_their_wire_names() {
    let fields = parse("1. Text: Hi\n2. Pronunciation: /haɪ/\n3. Translation: Chào");
    let value = serde_json::to_value(&fields).unwrap();
    assert_eq!(value["text"], "Hi");
    assert_eq!(value["pronunciation"], "/haɪ/");
    assert_eq!(value["translation"], "Chào");
}

//! End-to-end scenarios across both codecs.

use avsproperty::{encoding, BinValue, Error, Format, Property};

fn sample() -> Property {
    let mut prop = Property::new("root").unwrap();
    prop.settings.encoding = &encoding::UTF_8;
    let root = prop.root.as_mut().unwrap();
    root.new_node_with_value("a", 1u32).unwrap();
    root.new_node_with_value("b", "hi").unwrap();
    prop
}

fn encode(prop: &Property) -> Vec<u8> {
    let mut out = Vec::new();
    prop.write(&mut out).unwrap();
    out
}

fn decode(data: &[u8]) -> Property {
    let mut prop = Property::default();
    prop.read(data).unwrap();
    prop
}

#[test]
fn binary_header_bytes() {
    let data = encode(&sample());
    assert_eq!(&data[..4], &[0xA0, 0x42, 0xA0, 0x5F]);

    let prop = decode(&data);
    assert_eq!(prop.settings.format, Format::Binary);
    assert_eq!(prop.settings.encoding, &encoding::UTF_8);
    let root = prop.root.as_ref().unwrap();
    assert_eq!(root.search_child("a").unwrap().uint_value(), 1);
    assert_eq!(root.search_child("b").unwrap().string_value(), "hi");
}

#[test]
fn pretty_xml_output() {
    let mut prop = sample();
    prop.settings.format = Format::PrettyXml;
    let text = String::from_utf8(encode(&prop)).unwrap();

    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert!(text.contains("<root>\n"));
    assert!(text.contains("    <a __type=\"u32\">1</a>\n"));
    assert!(text.contains("    <b __type=\"str\">hi</b>\n"));
    assert!(text.ends_with("</root>\n"));
}

#[test]
fn binary_roundtrip_is_byte_identical() {
    let original = encode(&sample());
    let decoded = decode(&original);
    assert_eq!(encode(&decoded), original);
}

#[test]
fn cross_format_roundtrip_is_byte_identical() {
    let mut prop = sample();
    let root = prop.root.as_mut().unwrap();
    root.new_node_with_value("vec", [7i16, -8]).unwrap();
    root.new_node_with_value("arr", vec![1.5f32, 2.5]).unwrap();
    root.new_node_with_value("bin", BinValue(vec![0x00, 0xFF, 0x10])).unwrap();
    root.new_node_with_value("flag", true).unwrap();
    let child = root.new_node("child").unwrap();
    child.set_attribute("lang", "en").unwrap();
    child.new_node_with_value("t", avsproperty::TimeValue(1_234_567)).unwrap();
    let binary = encode(&prop);

    // binary -> xml
    let mut decoded = decode(&binary);
    assert_eq!(decoded.settings.format, Format::Binary);
    decoded.settings.format = Format::Xml;
    let xml = encode(&decoded);

    // xml -> binary
    let mut reread = decode(&xml);
    assert_eq!(reread.settings.format, Format::Xml);
    assert_eq!(reread.settings.encoding, &encoding::UTF_8);
    reread.settings.format = Format::Binary;
    assert_eq!(encode(&reread), binary);
}

#[test]
fn tuple_array_text_form() {
    let mut prop = Property::default();
    prop.read(&br#"<r __type="3u8" __count="2">1 2 3 4 5 6</r>"#[..]).unwrap();
    let root = prop.root.as_ref().unwrap();
    assert!(root.is_array());
    assert_eq!(root.array_length(), 2);

    let mut prop = Property::default();
    let err = prop.read(&br#"<r __type="3u8" __count="2">1 2 3 4 5</r>"#[..]).unwrap_err();
    assert!(err.to_string().contains("invalid number of elements in value"));
}

#[test]
fn misaligned_metadata_size_is_rejected() {
    let mut data = vec![0xA0, 0x42, 0x00, 0xFF];
    data.extend_from_slice(&5u32.to_be_bytes());
    data.extend_from_slice(&[0u8; 8]);

    let mut prop = Property::default();
    let err = prop.read(&data[..]).unwrap_err();
    assert_eq!(err.to_string(), "avsproperty: invalid section alignment");
}

#[test]
fn depth_cap_at_one_hundred() {
    fn deep(levels: usize) -> Vec<u8> {
        let mut prop = Property::new("n").unwrap();
        let mut cur = prop.root.as_mut().unwrap();
        for _ in 1..levels {
            cur = cur.new_node("n").unwrap();
        }
        encode(&prop)
    }

    let mut prop = Property::default();
    prop.read(&deep(100)[..]).unwrap();
    assert!(prop.root.is_some());

    let err = prop.read(&deep(101)[..]).unwrap_err();
    assert_eq!(err.to_string(), "avsproperty: max depth exceeded");
    assert!(prop.root.is_none());
}

#[test]
fn reserved_names_are_rejected_everywhere() {
    assert!(matches!(Property::new("__foo"), Err(Error::ReservedNodeName)));

    // a metadata stream carrying the packed form of "__"
    let mut data = vec![0xA0, 0x42, 0x00, 0xFF];
    data.extend_from_slice(&8u32.to_be_bytes());
    data.extend_from_slice(&[0x01, 0x02, 0x96, 0x50, 0xFE, 0xFF, 0x00, 0x00]);

    let mut prop = Property::default();
    assert!(matches!(prop.read(&data[..]), Err(Error::ReservedNodeName)));
}

#[test]
fn empty_values_survive_both_formats() {
    let mut prop = Property::new("r").unwrap();
    prop.settings.encoding = &encoding::UTF_8;
    let root = prop.root.as_mut().unwrap();
    root.new_node_with_value("s", "").unwrap();
    root.new_node_with_value("b", BinValue(Vec::new())).unwrap();

    for format in [Format::Binary, Format::Xml, Format::PrettyXml] {
        let mut prop = prop.clone();
        prop.settings.format = format;
        let decoded = decode(&encode(&prop));
        let root = decoded.root.as_ref().unwrap();
        assert_eq!(root.search_child("s").unwrap().string_value(), "");
        assert_eq!(root.search_child("b").unwrap().binary_value(), b"");
    }
}

#[test]
fn shift_jis_binary_strings() {
    let mut prop = Property::new("r").unwrap();
    prop.settings.encoding = &encoding::SHIFT_JIS;
    let root = prop.root.as_mut().unwrap();
    root.new_node_with_value("s", "あい").unwrap();

    let data = encode(&prop);
    // codepage 4 << 5 and its complement
    assert_eq!(&data[..4], &[0xA0, 0x42, 0x80, 0x7F]);

    let decoded = decode(&data);
    assert_eq!(decoded.settings.encoding, &encoding::SHIFT_JIS);
    assert_eq!(decoded.root.as_ref().unwrap().search_child("s").unwrap().string_value(), "あい");
}

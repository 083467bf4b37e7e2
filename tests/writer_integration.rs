use pdf_core::{Dictionary, IndirectObject, Name, ObjectCollection, Reference, Variant, WriteMode, Writer};

/// Builds a minimal one-page document (catalog, page tree, page) and checks
/// the overall shape of the serialized file: header, object bodies in
/// insertion order, and a trailer whose `/Root` and `/Size` match the
/// collection.
#[test]
fn writes_header_objects_xref_and_trailer() {
    let mut collection = ObjectCollection::new();
    let catalog_ref = collection.reserve();
    let pages_ref = collection.reserve();
    let page_ref = collection.reserve();

    let mut catalog = Dictionary::new();
    catalog.add_or_replace("Type", Variant::name(Name::from_str("Catalog"))).unwrap();
    catalog.add_or_replace("Pages", Variant::reference(pages_ref)).unwrap();
    collection.insert(IndirectObject::new(catalog_ref, Variant::dictionary(catalog)));

    let mut pages = Dictionary::new();
    pages.add_or_replace("Type", Variant::name(Name::from_str("Pages"))).unwrap();
    let mut kids = pdf_core::Array::new();
    kids.append(Variant::reference(page_ref)).unwrap();
    pages.add_or_replace("Kids", Variant::array(kids)).unwrap();
    pages.add_or_replace("Count", Variant::integer(1)).unwrap();
    collection.insert(IndirectObject::new(pages_ref, Variant::dictionary(pages)));

    let mut page = Dictionary::new();
    page.add_or_replace("Type", Variant::name(Name::from_str("Page"))).unwrap();
    page.add_or_replace("Parent", Variant::reference(pages_ref)).unwrap();
    collection.insert(IndirectObject::new(page_ref, Variant::dictionary(page)));

    let mut writer = Writer::new(WriteMode::Compact);
    writer.write_header(1, 7);
    writer.write_collection(&collection).unwrap();
    let bytes = writer.finish(catalog_ref);
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.starts_with("%PDF-1.7\n\n"));
    assert!(text.contains("1 0 obj\n<</Type/Catalog/Pages 2 0 R>>\nendobj\n"));
    assert!(text.contains("3 0 obj\n<</Type/Page/Parent 2 0 R>>\nendobj\n"));
    assert!(text.contains("xref\n0 4\n"));
    assert!(text.contains("trailer\n<</Size 4/Root 1 0 R>>"));
    assert!(text.trim_end().ends_with("%%EOF"));
}

#[test]
fn stream_object_gets_automatic_length() {
    let mut collection = ObjectCollection::new();
    let reference = collection.reserve();

    let mut dict = Dictionary::new();
    dict.add_or_replace("Type", Variant::name(Name::from_str("XObject"))).unwrap();
    let mut object = IndirectObject::new(reference, Variant::dictionary(dict));
    object.set_stream(pdf_core::Stream::new(b"BT ET".to_vec()));
    collection.insert(object);

    let mut writer = Writer::new(WriteMode::Compact);
    writer.write_collection(&collection).unwrap();
    let bytes = writer.finish(reference);
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.contains("/Length 5"));
    assert!(text.contains("stream\nBT ET\nendstream"));
}

#[test]
fn reference_equality_and_resolution_round_trip() {
    let mut collection = ObjectCollection::new();
    let value_ref = collection.insert_new(Variant::integer(42));

    let mut holder = Dictionary::new();
    holder.add_or_replace("V", Variant::reference(value_ref)).unwrap();

    let resolved = holder.find(&Name::from_str("V"), &collection).unwrap();
    assert_eq!(resolved.as_integer().unwrap(), 42);
    assert_eq!(value_ref, Reference::new(1, 0));
}

//! End-to-end symbolization tests: compile, extract, evaluate.

use map_common::{GeometryType, MapError};
use symbolizer::{
    compile_symbol_spec, symbolize, AttributeData, Feature, FeatureCollection, PropertyValue,
    RuleTuple, SymbolSpecConfig,
};
use test_utils::{
    assert_approx_eq, write_temp_file, CITY_FEATURES_JSON, CITY_SPEC_JSON, CLASS_FEATURES_JSON,
    CLASS_SPEC_JSON,
};

fn text(s: &str) -> PropertyValue {
    PropertyValue::Text(s.to_string())
}

fn number_features(attribute: &str, values: &[f64]) -> FeatureCollection {
    FeatureCollection::new(
        values
            .iter()
            .map(|&v| Feature::new(GeometryType::Point).with_attribute(attribute, v))
            .collect(),
    )
}

#[test]
fn test_class_scenario() {
    let spec = SymbolSpecConfig::from_json(CLASS_SPEC_JSON)
        .unwrap()
        .compile()
        .unwrap();
    let features = FeatureCollection::from_json(CLASS_FEATURES_JSON).unwrap();
    let table = symbolize(&spec, &features).unwrap();

    assert_eq!(table.properties_for(0).unwrap(), vec![("Color", &text("r"))]);
    assert_eq!(
        table.properties_for(1).unwrap(),
        vec![("Color", &text("k")), ("LineWidth", &PropertyValue::Number(2.0))]
    );
    assert_eq!(table.properties_for(2).unwrap(), vec![("Color", &text("k"))]);
}

#[test]
fn test_last_default_wins() {
    let spec = compile_symbol_spec(
        GeometryType::Point,
        &[
            RuleTuple::default_value("Color", "k"),
            RuleTuple::new("POP", 1.0, "Color", "r"),
            RuleTuple::default_value("color", "b"),
        ],
    )
    .unwrap();

    let color = spec.property("Color").unwrap();
    assert_eq!(color.default, Some(text("b")));
    assert_eq!(color.rules.len(), 1);
}

#[test]
fn test_last_rule_wins_for_subsets() {
    let spec = compile_symbol_spec(
        GeometryType::Point,
        &[
            RuleTuple::new("POP", [0.0, 100.0], "Color", "g"),
            RuleTuple::new("POP", 50.0, "Color", "r"),
        ],
    )
    .unwrap();
    let table = symbolize(&spec, &number_features("POP", &[10.0, 50.0, 200.0])).unwrap();

    assert_eq!(table.value(0, "Color"), Some(&text("g")));
    assert_eq!(table.value(1, "Color"), Some(&text("r")));
    assert_eq!(table.value(2, "Color"), None);
}

#[test]
fn test_nan_never_matches() {
    let rules = [
        RuleTuple::default_value("MarkerSize", 3.0),
        RuleTuple::new("POP", [f64::MIN, f64::MAX], "MarkerSize", 8.0),
        RuleTuple::new("POP", [0.0, 10.0], "MarkerSize", [1.0, 2.0]),
        RuleTuple::new(
            "POP",
            [0.0, 10.0],
            "Color",
            vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        ),
    ];
    let spec = compile_symbol_spec(GeometryType::Point, &rules).unwrap();
    let table = symbolize(&spec, &number_features("POP", &[f64::NAN])).unwrap();

    assert_eq!(
        table.properties_for(0).unwrap(),
        vec![("MarkerSize", &PropertyValue::Number(3.0))]
    );
}

#[test]
fn test_unset_cells_are_omitted() {
    let spec = compile_symbol_spec(
        GeometryType::Point,
        &[
            RuleTuple::new("POP", 1.0, "LineWidth", 4.0),
            RuleTuple::default_value("Color", "k"),
        ],
    )
    .unwrap();
    let table = symbolize(&spec, &number_features("POP", &[2.0])).unwrap();

    let pairs = table.properties_for(0).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].0, "Color");
}

#[test]
fn test_city_spec() {
    let spec = SymbolSpecConfig::from_json(CITY_SPEC_JSON)
        .unwrap()
        .compile()
        .unwrap();
    let features = FeatureCollection::from_json(CITY_FEATURES_JSON).unwrap();
    let table = symbolize(&spec, &features).unwrap();

    let size = |k: usize| table.value(k, "MarkerSize").and_then(|v| v.as_number()).unwrap();
    assert_approx_eq!(size(0), 4.06, 1e-9);
    assert_approx_eq!(size(1), 3.0, 1e-12);
    assert_approx_eq!(size(2), 6.08, 1e-9);
    assert_approx_eq!(size(3), 14.0, 1e-9);

    assert_eq!(
        table.value(0, "MarkerFaceColor"),
        Some(&PropertyValue::Rgb([0.0, 0.0, 1.0]))
    );
    assert_eq!(table.value(1, "MarkerFaceColor"), None);
    assert_eq!(
        table.value(3, "MarkerFaceColor"),
        Some(&PropertyValue::Rgb([1.0, 0.0, 0.0]))
    );

    assert_eq!(table.value(2, "Marker"), Some(&text("s")));
    assert_eq!(table.value(0, "Marker"), None);
}

#[test]
fn test_index_attribute() {
    let spec = compile_symbol_spec(
        GeometryType::Point,
        &[RuleTuple::new("INDEX", [2.0, 3.0], "Color", "m")],
    )
    .unwrap();
    let table = symbolize(&spec, &number_features("POP", &[0.0, 0.0, 0.0, 0.0])).unwrap();

    let colored: Vec<usize> = (0..table.feature_count())
        .filter(|&k| table.value(k, "Color").is_some())
        .collect();
    assert_eq!(colored, vec![1, 2]);
}

#[test]
fn test_geometry_mismatch() {
    let spec = SymbolSpecConfig::from_json(CLASS_SPEC_JSON)
        .unwrap()
        .compile()
        .unwrap();
    let err = symbolize(&spec, &number_features("CLASS", &[2.0])).unwrap_err();
    assert_eq!(
        err,
        MapError::GeometryMismatch {
            expected: GeometryType::Line,
            found: GeometryType::Point
        }
    );
}

#[test]
fn test_empty_collection() {
    let spec = SymbolSpecConfig::from_json(CLASS_SPEC_JSON)
        .unwrap()
        .compile()
        .unwrap();
    let table = symbolize(&spec, &FeatureCollection::default()).unwrap();
    assert_eq!(table.feature_count(), 0);
    assert_eq!(table.names(), &["Color".to_string(), "LineWidth".to_string()]);
}

#[test]
fn test_extraction_errors() {
    let spec = compile_symbol_spec(
        GeometryType::Point,
        &[
            RuleTuple::new("POP", 1.0, "Color", "r"),
            RuleTuple::new("NAME", "x", "Marker", "o"),
        ],
    )
    .unwrap();

    let feature = |pop: AttributeData, name: AttributeData| {
        FeatureCollection::new(vec![Feature::new(GeometryType::Point)
            .with_attribute("POP", pop)
            .with_attribute("NAME", name)])
    };

    let cases = [
        (
            feature(AttributeData::Integer(3), "a".into()),
            "NonDoubleAttribute",
        ),
        (
            feature(AttributeData::Logical(true), "a".into()),
            "NonDoubleAttribute",
        ),
        (
            feature(AttributeData::DoubleArray(vec![1.0, 2.0]), "a".into()),
            "NonScalarAttribute",
        ),
        (
            feature(AttributeData::DoubleArray(vec![]), "a".into()),
            "NonScalarAttribute",
        ),
        (
            feature(AttributeData::Double(f64::INFINITY), "a".into()),
            "NonFiniteAttribute",
        ),
        (
            feature(AttributeData::Complex { re: 1.0, im: 2.0 }, "a".into()),
            "NonFiniteAttribute",
        ),
        (
            feature(AttributeData::Double(1.0), AttributeData::Double(1.0)),
            "InconsistentAttributeType",
        ),
        (
            feature(
                AttributeData::Double(1.0),
                AttributeData::TextArray(vec!["a".into(), "b".into()]),
            ),
            "InconsistentAttributeType",
        ),
    ];

    for (collection, code) in cases {
        let err = symbolize(&spec, &collection).unwrap_err();
        assert_eq!(err.code(), code, "{:?}", collection.features[0].attributes);
    }

    let missing = FeatureCollection::new(vec![
        Feature::new(GeometryType::Point).with_attribute("NAME", "a")
    ]);
    assert_eq!(
        symbolize(&spec, &missing).unwrap_err(),
        MapError::MissingAttribute("POP".into())
    );
}

#[test]
fn test_single_element_text_array_is_accepted() {
    let spec = compile_symbol_spec(
        GeometryType::Point,
        &[RuleTuple::new("NAME", "Main", "Color", "r")],
    )
    .unwrap();
    let collection = FeatureCollection::new(vec![Feature::new(GeometryType::Point)
        .with_attribute("NAME", AttributeData::TextArray(vec!["Main".into()]))]);
    let table = symbolize(&spec, &collection).unwrap();
    assert_eq!(table.value(0, "Color"), Some(&text("r")));
}

#[test]
fn test_spec_from_file() {
    let (_dir, path) = write_temp_file("class.json", CLASS_SPEC_JSON).unwrap();
    let config = SymbolSpecConfig::from_file(&path).unwrap();
    assert_eq!(config.rules.len(), 3);
    assert!(config.validate().is_ok());

    let missing = SymbolSpecConfig::from_file(path.with_file_name("nope.json")).unwrap_err();
    assert_eq!(missing.code(), "IoError");
}

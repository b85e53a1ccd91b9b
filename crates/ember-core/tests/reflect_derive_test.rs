// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use ember_core::reflect::{
    Reflect, Reflected, ReflectError, TypeRegistry, Value, ValueKind, VARIANT_BASE,
};
use ember_core::{EntityId, Variant, VariantCreateInfo};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Default, ember_core::Reflect)]
enum Facing {
    #[default]
    North,
    East,
    South = 7,
}

#[derive(Debug, Clone, PartialEq, Default, ember_core::Reflect)]
struct Offset {
    dx: f32,
    dy: f32,
}

#[derive(Debug, Clone, PartialEq, Default, ember_core::Reflect)]
#[reflect(variant)]
struct Beacon {
    label: String,
    range: u16,
    facing: Facing,
    offset: Offset,
    history: Vec<Vec<i32>>,
    weights: BTreeMap<String, f64>,
    channels: BTreeSet<u8>,
    #[reflect(no_serialize)]
    cached_strength: f32,
    #[reflect(on_set = "retune")]
    frequency: i32,
    #[reflect(skip)]
    retune_count: usize,
}

impl Beacon {
    fn retune(&mut self) {
        self.retune_count += 1;
    }
}

impl Variant for Beacon {}

#[derive(Debug, Clone, PartialEq, Default, ember_core::Reflect)]
struct Calibration {
    gain: i32,
    #[reflect(no_serialize)]
    warm_cache: i32,
}

#[derive(Debug, Clone, PartialEq, Default, ember_core::Reflect)]
struct Rig {
    calibration: Calibration,
}

#[derive(Debug, Default, ember_core::Reflect)]
#[reflect(variant, name = "RenamedRelay")]
struct Relay {
    active: bool,
}

impl Variant for Relay {}

#[test]
fn descriptor_lists_properties_in_declaration_order() {
    // --- 1. ARRANGE ---
    let descriptor = Beacon::type_descriptor();

    // --- 2. ACT ---
    let names: Vec<_> = descriptor.properties().iter().map(|p| p.name).collect();

    // --- 3. ASSERT ---
    assert_eq!(
        names,
        vec![
            "label",
            "range",
            "facing",
            "offset",
            "history",
            "weights",
            "channels",
            "cached_strength",
            "frequency"
        ],
        "Skipped fields must not appear and order must follow the struct"
    );
    assert!(descriptor.is_descended_from(VARIANT_BASE));
    assert!(descriptor.no_serialize("cached_strength"));
    assert!(!descriptor.no_serialize("label"));
    assert_eq!(descriptor.on_set_callback("frequency"), Some("retune"));
}

#[test]
fn property_kinds_follow_field_types() {
    let descriptor = Beacon::type_descriptor();
    let kind = |name: &str| descriptor.property(name).unwrap().kind.clone();

    assert_eq!(kind("label"), ValueKind::String);
    assert_eq!(kind("range"), ValueKind::Integer);
    assert_eq!(kind("facing"), ValueKind::Enum("Facing"));
    assert_eq!(kind("offset"), ValueKind::Object("Offset"));
    assert_eq!(
        kind("history"),
        ValueKind::Sequence(Box::new(ValueKind::Sequence(Box::new(ValueKind::Integer))))
    );
    assert_eq!(
        kind("weights"),
        ValueKind::Associative(Box::new(ValueKind::String), Box::new(ValueKind::Float))
    );
    assert_eq!(kind("channels"), ValueKind::KeySet(Box::new(ValueKind::Integer)));
}

#[test]
fn set_through_descriptor_runs_on_set_callback() {
    // --- 1. ARRANGE ---
    let descriptor = Beacon::type_descriptor();
    let mut beacon = Beacon::default();

    // --- 2. ACT ---
    descriptor
        .set(&mut beacon, "frequency", Value::Int(88))
        .expect("Setting a declared property should succeed");
    descriptor
        .set(&mut beacon, "label", Value::from("north tower"))
        .expect("Setting a declared property should succeed");

    // --- 3. ASSERT ---
    assert_eq!(beacon.frequency, 88);
    assert_eq!(beacon.label, "north tower");
    assert_eq!(beacon.retune_count, 1, "Only the frequency has a callback");
}

#[test]
fn get_through_descriptor_reads_nested_object() {
    let descriptor = Beacon::type_descriptor();
    let beacon = Beacon {
        offset: Offset { dx: 1.5, dy: -2.0 },
        ..Default::default()
    };

    let value = descriptor.get(&beacon, "offset").unwrap();

    assert_eq!(value.member("dx"), Some(&Value::Float(1.5)));
    assert_eq!(value.member("dy"), Some(&Value::Float(-2.0)));
}

#[test]
fn accessor_rejects_wrong_instance() {
    let descriptor = Beacon::type_descriptor();
    let mut relay = Relay::default();

    let result = descriptor.set(&mut relay, "label", Value::from("x"));

    assert_eq!(result, Err(ReflectError::WrongInstance("Beacon")));
}

#[test]
fn unknown_property_is_reported() {
    let descriptor = Beacon::type_descriptor();
    let beacon = Beacon::default();

    let result = descriptor.get(&beacon, "altitude");

    assert!(matches!(result, Err(ReflectError::UnknownProperty { .. })));
}

#[test]
fn enums_convert_by_name_and_by_value() {
    assert_eq!(
        Facing::East.to_value(),
        Value::Enum {
            name: Some("East".to_string()),
            value: 1
        }
    );
    assert_eq!(Facing::from_value(Value::from("South")), Ok(Facing::South));
    assert_eq!(Facing::from_value(Value::Int(7)), Ok(Facing::South));
    assert!(matches!(
        Facing::from_value(Value::from("Up")),
        Err(ReflectError::UnknownEnumerator { .. })
    ));
}

#[test]
fn nested_object_keeps_defaults_for_missing_members() {
    let value = Value::Object(vec![("dy".to_string(), Value::Float(4.0))]);

    let offset = Offset::from_value(value).unwrap();

    assert_eq!(offset, Offset { dx: 0.0, dy: 4.0 });
}

#[test]
fn renamed_type_registers_under_its_new_name() {
    assert_eq!(Relay::TYPE_NAME, "RenamedRelay");
    assert_eq!(Relay::type_descriptor().name(), "RenamedRelay");
}

#[test]
fn inventory_collects_derived_types() {
    // --- 1. ARRANGE ---
    let registry = TypeRegistry::from_inventory();

    // --- 2. ACT ---
    let mut component_names: Vec<_> = registry
        .all_descended_from(VARIANT_BASE)
        .into_iter()
        .map(|d| d.name())
        .collect();
    component_names.sort();

    // --- 3. ASSERT ---
    assert_eq!(component_names, vec!["Beacon", "RenamedRelay"]);
    assert!(
        registry.lookup_by_name("Offset").is_some(),
        "Nested objects are registered but are not components"
    );
}

#[test]
fn registry_instantiates_components_by_name() {
    let registry = TypeRegistry::from_inventory();
    let info = VariantCreateInfo {
        entity_id: EntityId(9),
    };

    let (_, instance) = registry
        .instantiate("Beacon", &info, &[Value::from("gate"), Value::Int(40)])
        .expect("Beacon is constructible");

    let beacon = instance
        .as_ref()
        .as_any()
        .downcast_ref::<Beacon>()
        .expect("The instance should be a Beacon");
    assert_eq!(beacon.label, "gate");
    assert_eq!(beacon.range, 40);
}

#[test]
fn nested_no_serialize_members_stay_out_of_values() {
    // --- 1. ARRANGE ---
    let rig = Rig {
        calibration: Calibration {
            gain: 1,
            warm_cache: 99,
        },
    };

    // --- 2. ACT ---
    let value = rig.to_value();
    let rebuilt = Rig::from_value(Value::Object(vec![(
        "calibration".to_string(),
        Value::Object(vec![
            ("gain".to_string(), Value::Int(4)),
            ("warm_cache".to_string(), Value::Int(5)),
        ]),
    )]))
    .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(
        value,
        Value::Object(vec![(
            "calibration".to_string(),
            Value::Object(vec![("gain".to_string(), Value::Int(1))]),
        )])
    );
    assert_eq!(rebuilt.calibration.gain, 4);
    assert_eq!(rebuilt.calibration.warm_cache, 0, "Stored values never reach the cache");
}

#[test]
fn writing_a_nested_value_keeps_runtime_members() {
    // --- 1. ARRANGE ---
    let descriptor = Rig::type_descriptor();
    let mut rig = Rig {
        calibration: Calibration {
            gain: 1,
            warm_cache: 99,
        },
    };
    let update = Value::Object(vec![("gain".to_string(), Value::Int(7))]);

    // --- 2. ACT ---
    descriptor.set(&mut rig, "calibration", update).unwrap();
    let rejected = descriptor.set(
        &mut rig,
        "calibration",
        Value::Object(vec![("gain".to_string(), Value::from("loud"))]),
    );

    // --- 3. ASSERT ---
    assert_eq!(
        rig.calibration,
        Calibration {
            gain: 7,
            warm_cache: 99
        }
    );
    assert!(rejected.is_err());
    assert_eq!(rig.calibration.gain, 7, "A failed write leaves the value alone");
}

#![no_main]
use libfuzzer_sys::fuzz_target;
use tablebuf::options::DecodeLimits;
use tablebuf::schema::{ElementType, FieldDef, FieldDefault, ScalarType, TableDef};
use tablebuf::Table;

static OPERATOR_CODE: TableDef = TableDef::new(
    "OperatorCode",
    &[
        FieldDef::scalar("builtin_code", 0, ScalarType::Int8, FieldDefault::Int(0)),
        FieldDef::string("custom_code", 1),
        FieldDef::scalar("version", 2, ScalarType::Int32, FieldDefault::Int(1)),
    ],
);

static NODE_FIELDS: [FieldDef; 3] = [
    FieldDef::vector("codes", 0, ElementType::Table(&OPERATOR_CODE)),
    FieldDef::table("next", 1, &NODE),
    FieldDef::vector("weights", 2, ElementType::Scalar(ScalarType::Float32)),
];
static NODE: TableDef = TableDef::new("Node", &NODE_FIELDS);

fuzz_target!(|data: &[u8]| {
    let limits = DecodeLimits::default().with_max_depth(16).with_max_tables(1024);
    if let Ok(table) = Table::open(data, 0) {
        let _ = NODE.decode(&table, &limits);
    }
});

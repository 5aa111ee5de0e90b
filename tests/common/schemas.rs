// Gemeinsame Tabellen-Definitionen (Operator-Optionen) fuer Integrationstests.
//
// Wird per `include!` eingebunden. Benötigte Imports:
//   use tablebuf::schema::{ElementType, FieldDef, FieldDefault, ScalarType, TableDef};

static CONCATENATION_OPTIONS: TableDef = TableDef::new(
    "ConcatenationOptions",
    &[
        FieldDef::scalar("axis", 0, ScalarType::Int32, FieldDefault::Int(0)),
        FieldDef::scalar("fused_activation_function", 1, ScalarType::Int8, FieldDefault::Int(0)),
    ],
);

static OPERATOR_CODE: TableDef = TableDef::new(
    "OperatorCode",
    &[
        FieldDef::scalar("builtin_code", 0, ScalarType::Int8, FieldDefault::Int(0)),
        FieldDef::string("custom_code", 1),
        FieldDef::scalar("version", 2, ScalarType::Int32, FieldDefault::Int(1)),
    ],
);

static BIDIRECTIONAL_SEQUENCE_RNN_OPTIONS: TableDef = TableDef::new(
    "BidirectionalSequenceRNNOptions",
    &[
        FieldDef::scalar("time_major", 0, ScalarType::Bool, FieldDefault::Bool(false)),
        FieldDef::scalar("fused_activation_function", 1, ScalarType::Int8, FieldDefault::Int(0)),
        FieldDef::scalar("merge_outputs", 2, ScalarType::Bool, FieldDefault::Bool(false)),
        FieldDef::scalar("asymmetric_quantize_inputs", 3, ScalarType::Bool, FieldDefault::Bool(false)),
    ],
);

static LOCAL_RESPONSE_NORMALIZATION_OPTIONS: TableDef = TableDef::new(
    "LocalResponseNormalizationOptions",
    &[
        FieldDef::scalar("radius", 0, ScalarType::Int32, FieldDefault::Int(0)),
        FieldDef::scalar("bias", 1, ScalarType::Float32, FieldDefault::Float(0.0)),
        FieldDef::scalar("alpha", 2, ScalarType::Float32, FieldDefault::Float(0.0)),
        FieldDef::scalar("beta", 3, ScalarType::Float32, FieldDefault::Float(0.0)),
    ],
);

/// Minimal model: operator codes, tensor indices, names and one options table.
static MODEL: TableDef = TableDef::new(
    "Model",
    &[
        FieldDef::scalar("version", 0, ScalarType::UInt32, FieldDefault::UInt(3)),
        FieldDef::vector("operator_codes", 1, ElementType::Table(&OPERATOR_CODE)),
        FieldDef::string("description", 2),
        FieldDef::vector("inputs", 3, ElementType::Scalar(ScalarType::Int32)),
        FieldDef::vector("tensor_names", 4, ElementType::String),
        FieldDef::table("concat", 5, &CONCATENATION_OPTIONS),
        FieldDef::table("lrn", 6, &LOCAL_RESPONSE_NORMALIZATION_OPTIONS),
        FieldDef::vector("buffer", 7, ElementType::Scalar(ScalarType::UInt8)),
    ],
);

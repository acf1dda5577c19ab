// paramcheck-core/src/application/sample.rs
//
// Sample project written by `paramcheck init`: a small 5G NR knowledge base
// and two cells of exported MO data exercising filters, multi-value
// switches, subsequent rules and a missing MO table.

use crate::domain::knowledge::{
    CheckKind, LogicalRelation, ParameterDefinition, ParameterType, ValidationRule,
};

/// One MO data table: a header row and its data rows.
pub struct SampleTable {
    pub mo_name: &'static str,
    pub columns: &'static [&'static str],
    pub rows: &'static [&'static [&'static str]],
}

fn definition(
    mo_name: &str,
    mo_description: &str,
    name: &str,
    id: &str,
    parameter_type: ParameterType,
    meaning: &str,
    value_description: &str,
) -> ParameterDefinition {
    ParameterDefinition {
        mo_name: mo_name.into(),
        mo_description: mo_description.into(),
        scenario: "空域配置".into(),
        parameter_name: name.into(),
        parameter_id: id.into(),
        parameter_type,
        parameter_meaning: meaning.into(),
        value_description: value_description.into(),
    }
}

#[allow(clippy::too_many_arguments)]
fn rule(
    id: &str,
    mo_name: &str,
    check_kind: CheckKind,
    combination: &str,
    expected: &str,
    filter: &str,
    relation: LogicalRelation,
    order: u32,
    next: &str,
    description: &str,
) -> ValidationRule {
    ValidationRule {
        rule_id: id.into(),
        mo_name: mo_name.into(),
        check_kind,
        parameter_combination: combination.into(),
        expected_value: expected.into(),
        filter_condition: (!filter.is_empty()).then(|| filter.to_string()),
        logical_relation: relation,
        execution_order: order,
        subsequent_rule: (!next.is_empty()).then(|| next.to_string()),
        description: description.into(),
    }
}

pub fn knowledge() -> (Vec<ParameterDefinition>, Vec<ValidationRule>) {
    use CheckKind::{Misconfiguration, MissingConfiguration};
    use LogicalRelation::{And, Or};

    let definitions = vec![
        definition(
            "NRDUCELL",
            "NR DU小区",
            "小区半径",
            "CellRadius",
            ParameterType::Single,
            "小区覆盖半径，单位为米",
            "",
        ),
        definition(
            "NRCELLALGOSWITCH",
            "NR小区算法开关",
            "异频切换算法开关",
            "InterFreqHoSwitch",
            ParameterType::Multiple,
            "异频切换相关算法开关组",
            "基于覆盖的异频切换开关:控制基于覆盖的异频切换功能;异频重定向开关:控制异频重定向功能",
        ),
        definition(
            "NRINTERRATHOPARAM",
            "NR异频切换参数",
            "CC值",
            "CCValue",
            ParameterType::Single,
            "切换控制参数",
            "",
        ),
        definition(
            "NRCELLFREQRELATION",
            "NR小区频率关系",
            "邻区类型",
            "NeighborType",
            ParameterType::Single,
            "邻区类型定义",
            "",
        ),
        definition(
            "NRCELLFREQRELATION",
            "NR小区频率关系",
            "载波频点",
            "CarrierFreq",
            ParameterType::Single,
            "载波频点值",
            "",
        ),
    ];

    let rules = vec![
        rule(
            "RULE001",
            "NRDUCELL",
            Misconfiguration,
            "小区半径",
            "8000",
            "",
            And,
            1,
            "",
            "小区半径应为8000米",
        ),
        rule(
            "RULE002",
            "NRCELLALGOSWITCH",
            Misconfiguration,
            "异频切换算法开关",
            "基于覆盖的异频切换开关:开&异频重定向开关:开",
            "(小区类型=宏站 and 覆盖场景=城区)",
            And,
            1,
            "",
            "城区宏站的异频切换开关应为开启状态",
        ),
        rule(
            "RULE003",
            "NRINTERRATHOPARAM",
            Misconfiguration,
            "CC值",
            "A",
            "(频段=N78 and 带宽>=100)",
            And,
            1,
            "RULE004",
            "N78频段且带宽>=100MHz时CC值应为A",
        ),
        rule(
            "RULE004",
            "NRINTERRATHOPARAM",
            Misconfiguration,
            "CC值",
            "B",
            "(频段=N41 or 带宽<100)",
            Or,
            2,
            "",
            "或者N41频段或带宽<100MHz时CC值应为B",
        ),
        rule(
            "RULE005",
            "NRCELLFREQRELATION",
            MissingConfiguration,
            "邻区类型&载波频点",
            "同频&2100",
            "(小区类型=宏站 and 覆盖场景=城区)",
            And,
            1,
            "RULE006",
            "城区宏站必须配置2100MHz同频邻区",
        ),
        rule(
            "RULE006",
            "NRCELLFREQRELATION",
            Misconfiguration,
            "优先级",
            "5",
            "(邻区类型=同频 and 载波频点=2100)",
            And,
            2,
            "",
            "2100MHz同频邻区优先级应为5",
        ),
    ];

    (definitions, rules)
}

pub const SAMPLE_TABLES: &[SampleTable] = &[
    SampleTable {
        mo_name: "NRDUCELL",
        columns: &["f_site_id", "f_cell_id", "小区半径"],
        rows: &[&["1", "1", "8000"], &["1", "2", "7000"]],
    },
    SampleTable {
        mo_name: "NRCELLALGOSWITCH",
        columns: &["f_site_id", "f_cell_id", "小区类型", "覆盖场景", "异频切换算法开关"],
        rows: &[
            &["1", "1", "宏站", "城区", "基于覆盖的异频切换开关:开&异频重定向开关:关"],
            &["1", "2", "微站", "城区", "基于覆盖的异频切换开关:关&异频重定向开关:关"],
        ],
    },
    SampleTable {
        mo_name: "NRINTERRATHOPARAM",
        columns: &["f_site_id", "f_cell_id", "频段", "带宽", "CC值"],
        rows: &[&["1", "1", "N78", "100", "A"], &["1", "2", "N41", "40", "A"]],
    },
    SampleTable {
        mo_name: "NRCELLFREQRELATION",
        columns: &["f_site_id", "f_cell_id", "小区类型", "覆盖场景", "邻区类型", "载波频点", "优先级"],
        rows: &[&["1", "1", "宏站", "城区", "同频", "2100", "5"]],
    },
];

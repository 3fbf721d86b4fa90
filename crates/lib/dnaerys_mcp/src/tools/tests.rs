// @zen-component: MCP-ToolTests

use rmcp::model::CallToolResult;

use super::{count_result, json_result, list_result, text_result};
use crate::server::DnaerysMcpServer;

pub(crate) fn texts(result: &CallToolResult) -> Vec<String> {
    result
        .content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.clone()))
        .collect()
}

#[test]
fn server_exposes_all_tools() {
    let tools = DnaerysMcpServer::list_tools();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
    assert_eq!(tools.len(), 31, "Expected 31 tools, got: {names:?}");
    for expected in [
        "dataset_info",
        "variants_total",
        "nodes_total",
        "count_samples_total",
        "count_female_samples_total",
        "count_male_samples_total",
        "sample_ids",
        "female_sample_ids",
        "male_sample_ids",
        "count_variants_in_region",
        "count_homozygous_variants_in_region",
        "count_heterozygous_variants_in_region",
        "count_variants_in_region_in_sample",
        "count_homozygous_variants_in_region_in_sample",
        "count_heterozygous_variants_in_region_in_sample",
        "select_variants_in_region",
        "select_homozygous_variants_in_region",
        "select_heterozygous_variants_in_region",
        "select_variants_in_region_in_sample",
        "select_homozygous_variants_in_region_in_sample",
        "select_heterozygous_variants_in_region_in_sample",
        "count_samples_with_variants",
        "count_samples_with_hom_variants",
        "count_samples_with_het_variants",
        "select_samples_with_variants",
        "select_samples_with_hom_variants",
        "select_samples_with_het_variants",
        "de_novo_in_trio",
        "het_dominant_in_trio",
        "hom_recessive_in_trio",
        "kinship",
    ] {
        assert!(names.contains(&expected), "missing tool {expected}");
    }
}

#[test]
fn every_tool_has_a_description() {
    for tool in DnaerysMcpServer::list_tools() {
        let description = tool.description.unwrap_or_default();
        assert!(!description.is_empty(), "{} has no description", tool.name);
    }
}

#[test]
fn region_tools_document_their_parameters() {
    let tools = DnaerysMcpServer::list_tools();
    let tool = tools
        .iter()
        .find(|t| t.name == "select_variants_in_region_in_sample")
        .expect("tool");
    let props = tool.input_schema["properties"]
        .as_object()
        .expect("properties");
    for key in ["sampleId", "chromosome", "start", "end", "impact", "limit"] {
        assert!(props.contains_key(key), "missing {key}");
    }
}

#[test]
fn lists_render_one_item_per_element() {
    let result = list_result(vec!["{}".into()]).unwrap();
    assert_eq!(texts(&result), vec!["{}"]);

    let result = list_result(vec!["S1".into(), "S2".into()]).unwrap();
    assert_eq!(texts(&result), vec!["S1", "S2"]);
}

#[test]
fn scalars_render_as_single_text() {
    assert_eq!(texts(&count_result(42).unwrap()), vec!["42"]);
    assert_eq!(texts(&text_result(String::new()).unwrap()), vec![""]);
}

#[test]
fn json_renders_pretty() {
    let result = json_result(serde_json::json!({ "variantsTotal": 1 })).unwrap();
    let text = &texts(&result)[0];
    assert!(text.contains('\n'));
    let parsed: serde_json::Value = serde_json::from_str(text).unwrap();
    assert_eq!(parsed["variantsTotal"], 1);
}

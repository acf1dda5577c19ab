// paramcheck/src/commands/eval.rs
//
// USE CASE: Ad-hoc evaluation of a condition expression.

use anyhow::bail;
use paramcheck_core::domain::condition::{ConditionNode, evaluate, failed_comparisons, parse};
use paramcheck_core::domain::group::ParameterContext;
use paramcheck_core::domain::value::ParameterValue;

pub fn execute(expression: &str, params: &[String]) -> anyhow::Result<()> {
    let node = match parse(expression) {
        Ok(node) => node,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(1);
        }
    };

    let ctx = parse_params(params)?;
    println!("{}", render_tree(&node));

    let holds = evaluate(&node, &ctx)?;
    println!("result: {}", holds);
    if !holds {
        for failed in failed_comparisons(&node, &ctx)? {
            match &failed.actual {
                Some(actual) => println!(
                    "   ✗ {}{}{} (actual {})",
                    failed.param, failed.operator, failed.literal, actual
                ),
                None => println!(
                    "   ✗ {}{}{} ({} is absent)",
                    failed.param, failed.operator, failed.literal, failed.param
                ),
            }
        }
    }
    Ok(())
}

fn parse_params(params: &[String]) -> anyhow::Result<ParameterContext> {
    let mut ctx = ParameterContext::default();
    for param in params {
        let Some((name, value)) = param.split_once('=') else {
            bail!("Invalid parameter '{}', expected name=value", param);
        };
        ctx.insert(name.trim(), ParameterValue::infer(value.trim()));
    }
    Ok(ctx)
}

/// One node per line, children indented under their connective.
fn render_tree(node: &ConditionNode) -> String {
    let mut lines = Vec::new();
    push_node(node, 0, &mut lines);
    lines.join("\n")
}

fn push_node(node: &ConditionNode, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match node {
        ConditionNode::Comparison { .. } => lines.push(format!("{}{}", indent, node)),
        ConditionNode::And { left, right } | ConditionNode::Or { left, right } => {
            let label = if matches!(node, ConditionNode::And { .. }) { "AND" } else { "OR" };
            lines.push(format!("{}{}", indent, label));
            push_node(left, depth + 1, lines);
            push_node(right, depth + 1, lines);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_render_tree() -> Result<()> {
        let node = parse("(频段=N78 and 带宽>=100) or 小区类型!=微站")?;
        assert_eq!(
            render_tree(&node),
            "OR\n  AND\n    频段=N78\n    带宽>=100\n  小区类型!=微站"
        );
        Ok(())
    }

    #[test]
    fn test_parse_params() -> Result<()> {
        let ctx = parse_params(&["带宽 = 100".to_string(), "sw=a:on&b:off".to_string()])?;
        assert!(ctx.get("带宽").is_some());
        assert!(ctx.get("sw").unwrap().as_multi().is_some());
        assert!(parse_params(&["oops".to_string()]).is_err());
        Ok(())
    }
}

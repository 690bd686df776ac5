// src/enrich/prompt.rs
use std::fmt::Write;

use crate::ingest::prompt_text;
use crate::model::RawRecord;

const ROLE: &str = "你是一个保险欺诈监测专家。";

const TASKS: &str = "\
1. 分类：判断案例属于以下哪一类 [寿险, 产险, 再保险, 大健康]
2. 摘要：生成 100 字以内的中文精简摘要，包含案件性质、涉及金额（如有）、主要嫌疑人、处理结果
3. 翻译：提供标题的中文(zh)、英文(en)、泰语(th)、越南语(vi)版本";

const ITEM_SHAPE: &str = r#"{
  "category": "寿险|产险|再保险|大健康",
  "summary": "100字以内的中文精简摘要",
  "translations": {"zh": "中文标题", "en": "英文标题", "th": "泰语标题", "vi": "越南语标题"}
}"#;

fn describe(out: &mut String, record: &RawRecord) {
    let title = record.title_text().map(prompt_text);
    let desc = record.description_text().map(prompt_text);
    let _ = writeln!(out, "标题: {}", title.as_deref().unwrap_or("无标题"));
    let _ = writeln!(out, "摘要: {}", desc.as_deref().unwrap_or("无摘要"));
    let _ = writeln!(out, "来源: {}", record.source_name());
    let _ = writeln!(
        out,
        "发布时间: {}",
        record.published_at.as_deref().unwrap_or("未知")
    );
}

/// Prompt for several records; asks for a JSON array in submission order.
pub fn batch_prompt(records: &[RawRecord]) -> String {
    let mut out = String::with_capacity(512 * records.len() + 1024);
    let _ = writeln!(
        out,
        "{ROLE}请逐条分析以下 {} 条英文新闻，对每一条完成以下任务：\n\n{TASKS}\n",
        records.len()
    );
    for (i, rec) in records.iter().enumerate() {
        let _ = writeln!(out, "**新闻 {}：**", i + 1);
        describe(&mut out, rec);
        out.push('\n');
    }
    let _ = write!(
        out,
        "请只返回一个 JSON 数组，长度为 {n}，顺序与上面的新闻顺序完全一致（第 i 个元素对应新闻 i），不要输出其他文字。数组每个元素的格式如下：\n{ITEM_SHAPE}",
        n = records.len()
    );
    out
}

/// Prompt for one record; asks for a single JSON object.
pub fn single_prompt(record: &RawRecord) -> String {
    let mut out = String::with_capacity(1024);
    let _ = writeln!(
        out,
        "{ROLE}请分析以下英文新闻，完成以下任务：\n\n{TASKS}\n\n**原始新闻信息：**"
    );
    describe(&mut out, record);
    let _ = write!(
        out,
        "\n请只返回一个 JSON 对象，不要输出其他文字，格式如下：\n{ITEM_SHAPE}"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_prompt_numbers_records_in_order() {
        let recs: Vec<RawRecord> = ["A title", "B title"]
            .iter()
            .map(|t| RawRecord {
                title: Some(t.to_string()),
                ..Default::default()
            })
            .collect();
        let p = batch_prompt(&recs);
        let a = p.find("A title").unwrap();
        let b = p.find("B title").unwrap();
        assert!(a < b);
        assert!(p.contains("长度为 2"));
    }

    #[test]
    fn single_prompt_marks_missing_fields() {
        let p = single_prompt(&RawRecord::default());
        assert!(p.contains("无标题"));
        assert!(p.contains("来源: unknown"));
    }
}

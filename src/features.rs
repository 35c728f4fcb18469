use anyhow::{Context, Result};
use log::info;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;

use crate::common::format_elapsed;
use crate::pipeline::PipelineOutput;

/// Output format, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Parquet,
    Csv,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()) {
            Some(ext) if ext == "parquet" => Ok(TableFormat::Parquet),
            Some(ext) if ext == "csv" => Ok(TableFormat::Csv),
            _ => Err(anyhow::anyhow!(
                "Unsupported output extension for {} (expected .parquet or .csv)",
                path.display()
            )),
        }
    }
}

/// One row per paper, in corpus order, with the columns the regression model reads
pub fn build_feature_frame(output: &PipelineOutput) -> Result<DataFrame> {
    let corpus = output.resolved.corpus();
    let n = corpus.len();

    let mut paper_ids = Vec::with_capacity(n);
    let mut years: Vec<Option<i32>> = Vec::with_capacity(n);
    let mut titles: Vec<Option<String>> = Vec::with_capacity(n);
    let mut venues: Vec<Option<String>> = Vec::with_capacity(n);
    let mut journals: Vec<Option<String>> = Vec::with_capacity(n);
    let mut fields: Vec<Option<String>> = Vec::with_capacity(n);
    let mut n_authors = Vec::with_capacity(n);
    let mut n_references = Vec::with_capacity(n);
    let mut paper_citations = Vec::with_capacity(n);
    let mut max_author_hindex = Vec::with_capacity(n);
    let mut citations_n = Vec::with_capacity(n);

    for paper in corpus.iter() {
        paper_ids.push(paper.id.clone());
        years.push(paper.year());
        titles.push(paper.title.clone());
        venues.push(paper.venue.clone().filter(|v| !v.is_empty()));
        journals.push(paper.journal_name.clone().filter(|j| !j.is_empty()));
        fields.push(
            paper
                .fields_of_study
                .as_ref()
                .filter(|f| !f.is_empty())
                .map(|f| f.join(";")),
        );
        n_authors.push(paper.authors.as_ref().map_or(0, |a| a.len() as u32));
        n_references.push(paper.out_citations.as_ref().map_or(0, |c| c.len() as u32));
        paper_citations.push(output.counters.paper_count(&paper.id));
        max_author_hindex.push(output.max_hindex.get(&paper.id));
        citations_n.push(paper.in_citations.as_ref().map_or(0, |c| c.len() as u32));
    }

    DataFrame::new(vec![
        Column::new("paper_id".into(), &paper_ids),
        Column::new("year".into(), &years),
        Column::new("title".into(), &titles),
        Column::new("venue".into(), &venues),
        Column::new("journal_name".into(), &journals),
        Column::new("fields_of_study".into(), &fields),
        Column::new("n_authors".into(), &n_authors),
        Column::new("n_references".into(), &n_references),
        Column::new("paper_citations".into(), &paper_citations),
        Column::new("max_author_hindex".into(), &max_author_hindex),
        Column::new("citations_n".into(), &citations_n),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to create feature DataFrame: {}", e))
}

/// One row per credited author, sorted by h-index (descending) then id
pub fn build_author_frame(output: &PipelineOutput) -> Result<DataFrame> {
    let mut rows: Vec<(u64, u32, u32, u32)> = output
        .counters
        .author_citations
        .iter()
        .map(|(author, papers)| {
            let h = output.author_h.get(author).copied().unwrap_or(0);
            (*author, papers.len() as u32, papers.values().sum::<u32>(), h)
        })
        .collect();
    rows.sort_unstable_by(|a, b| b.3.cmp(&a.3).then(a.0.cmp(&b.0)));

    let author_ids: Vec<u64> = rows.iter().map(|r| r.0).collect();
    let papers_cited: Vec<u32> = rows.iter().map(|r| r.1).collect();
    let total_citations: Vec<u32> = rows.iter().map(|r| r.2).collect();
    let h_index: Vec<u32> = rows.iter().map(|r| r.3).collect();

    DataFrame::new(vec![
        Column::new("author_id".into(), &author_ids),
        Column::new("papers_cited".into(), &papers_cited),
        Column::new("total_citations".into(), &total_citations),
        Column::new("h_index".into(), &h_index),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to create author DataFrame: {}", e))
}

/// Write a table as Parquet (zstd) or CSV depending on the extension of `path`
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    let format = TableFormat::from_path(path)?;
    info!("Writing {} rows to {}", df.height(), path.display());
    let start = Instant::now();

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    match format {
        TableFormat::Parquet => {
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Zstd(None))
                .with_row_group_size(Some(250_000))
                .finish(df)
                .with_context(|| format!("Failed to write Parquet: {}", path.display()))?;
        }
        TableFormat::Csv => {
            CsvWriter::new(file)
                .include_header(true)
                .finish(df)
                .with_context(|| format!("Failed to write CSV: {}", path.display()))?;
        }
    }

    info!("Wrote {} in {}", path.display(), format_elapsed(start.elapsed()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{AuthorMention, Corpus, PaperRecord};
    use crate::pipeline::FeaturePipeline;
    use tempfile::tempdir;

    fn output() -> PipelineOutput {
        let mut cited = PaperRecord::new("cited")
            .with_year(2000)
            .with_authors(vec![AuthorMention::new("Ann", &["1"]), AuthorMention::new("Ben", &[])])
            .with_in_citations(&["x", "y", "late"]);
        cited.venue = Some("NeurIPS".to_string());
        cited.fields_of_study = Some(vec!["Computer Science".to_string(), "Mathematics".to_string()]);

        let corpus = Corpus::from_papers(vec![
            cited,
            PaperRecord::new("late").with_year(2020),
            PaperRecord::new("bare"),
        ]);
        FeaturePipeline::default().run(corpus)
    }

    #[test]
    fn test_feature_frame_columns() {
        let df = build_feature_frame(&output()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.column("paper_id").unwrap().str().unwrap().get(0), Some("cited"));
        assert_eq!(df.column("paper_citations").unwrap().u32().unwrap().get(0), Some(2));
        assert_eq!(df.column("citations_n").unwrap().u32().unwrap().get(0), Some(3));
        assert_eq!(df.column("max_author_hindex").unwrap().u32().unwrap().get(0), Some(1));
        assert_eq!(df.column("n_authors").unwrap().u32().unwrap().get(0), Some(2));
        assert_eq!(
            df.column("fields_of_study").unwrap().str().unwrap().get(0),
            Some("Computer Science;Mathematics")
        );
        assert_eq!(df.column("year").unwrap().i32().unwrap().get(2), None);
        assert_eq!(df.column("paper_citations").unwrap().u32().unwrap().get(2), Some(0));
    }

    #[test]
    fn test_author_frame() {
        let df = build_author_frame(&output()).unwrap();

        assert_eq!(df.height(), 2);
        let ids = df.column("author_id").unwrap().u64().unwrap();
        assert_eq!(ids.get(0), Some(1));
        assert_eq!(ids.get(1), Some(2));
        assert_eq!(df.column("total_citations").unwrap().u32().unwrap().get(0), Some(2));
    }

    #[test]
    fn test_write_parquet_and_csv() {
        let dir = tempdir().unwrap();
        let out = output();

        let parquet_path = dir.path().join("features.parquet");
        write_table(&mut build_feature_frame(&out).unwrap(), &parquet_path).unwrap();
        let loaded = LazyFrame::scan_parquet(parquet_path.to_str().unwrap(), Default::default())
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(loaded.height(), 3);

        let csv_path = dir.path().join("features.csv");
        write_table(&mut build_feature_frame(&out).unwrap(), &csv_path).unwrap();
        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(text.starts_with("paper_id,year,title,venue"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        assert!(TableFormat::from_path(Path::new("features.xlsx")).is_err());
        assert_eq!(
            TableFormat::from_path(Path::new("out/FEATURES.CSV")).unwrap(),
            TableFormat::Csv
        );
    }
}

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use diesel::prelude::*;
use diesel::sql_types::Text;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;

/// Table and column casing used by different e-Sword releases.
pub enum Schema {
    Lower,
    Capitalized,
}

/// Creates a dictionary module at `dir/name` with the given rows.
pub fn create_esword_module(dir: &TempDir, name: &str, schema: Schema, rows: &[(Option<&str>, Option<&str>)]) -> PathBuf {
    let db_path = dir.path().join(name);
    let mut conn = SqliteConnection::establish(db_path.to_str().unwrap()).unwrap();

    let (create, insert) = match schema {
        Schema::Lower => (
            "CREATE TABLE entries (word TEXT, definition TEXT)",
            "INSERT INTO entries (word, definition) VALUES (?, ?)",
        ),
        Schema::Capitalized => (
            "CREATE TABLE Entries (Word TEXT, Definition TEXT)",
            "INSERT INTO Entries (Word, Definition) VALUES (?, ?)",
        ),
    };

    diesel::sql_query(create).execute(&mut conn).unwrap();

    for (word, definition) in rows {
        diesel::sql_query(insert)
            .bind::<diesel::sql_types::Nullable<Text>, _>(*word)
            .bind::<diesel::sql_types::Nullable<Text>, _>(*definition)
            .execute(&mut conn)
            .unwrap();
    }

    db_path
}

/// Creates an SQLite file without any entries table.
pub fn create_empty_store(dir: &TempDir, name: &str) -> PathBuf {
    let db_path = dir.path().join(name);
    let mut conn = SqliteConnection::establish(db_path.to_str().unwrap()).unwrap();
    diesel::sql_query("CREATE TABLE Details (Title TEXT)").execute(&mut conn).unwrap();
    db_path
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Writes a PDF with one page per item of `pages`, each line of a page set in
/// Courier one line below the other. An empty page has no text layer.
pub fn create_text_pdf(dir: &TempDir, name: &str, pages: &[&[&str]]) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 760.into()]),
        ];
        for line in lines.iter() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("Td", vec![0.into(), (-24).into()]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(pages_id, Object::Dictionary(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    }));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let pdf_path = dir.path().join(name);
    doc.save(&pdf_path).unwrap();
    pdf_path
}

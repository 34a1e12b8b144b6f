//! Parser for the Book-Crossing CSV files.
//!
//! This module handles parsing the three dataset files:
//! - books.csv: ISBN, Book-Title, Book-Author, Year-Of-Publication, Publisher
//! - ratings.csv: User-ID, ISBN, Book-Rating
//! - users.csv: User-ID, Location, Age
//!
//! The files are headered, comma-delimited, and ISO-8859-1 encoded. Each
//! file is decoded to UTF-8 first and then parsed with the `csv` crate into
//! intermediate record structs; lenient fields (publication year, age) are
//! converted afterwards, the way a dataframe reader would tolerate them.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Helper function to read a file with ISO-8859-1 encoding (Latin-1)
///
/// The Book-Crossing dataset uses ISO-8859-1 encoding, not UTF-8.
/// ISO-8859-1 is a single-byte encoding where each byte directly maps to a
/// Unicode code point, so the conversion is a plain byte-to-char map.
fn read_to_string_latin1(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    Ok(bytes.iter().map(|&b| b as char).collect())
}

// =============================================================================
// Raw CSV records
// =============================================================================
// The dataset's column names are not Rust identifiers, so each file gets an
// intermediate record struct with serde renames. Columns we don't model
// (e.g. the image URLs in books.csv) are skipped by the reader.

#[derive(Debug, Deserialize)]
struct RawBook {
    #[serde(rename = "ISBN")]
    isbn: String,
    #[serde(rename = "Book-Title")]
    title: String,
    #[serde(rename = "Book-Author")]
    author: String,
    #[serde(rename = "Year-Of-Publication")]
    year: String,
    #[serde(rename = "Publisher")]
    publisher: String,
}

#[derive(Debug, Deserialize)]
struct RawRating {
    #[serde(rename = "User-ID")]
    user_id: UserId,
    #[serde(rename = "ISBN")]
    isbn: String,
    #[serde(rename = "Book-Rating")]
    rating: f32,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    #[serde(rename = "User-ID")]
    id: UserId,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Age")]
    age: String,
}

/// Map a csv deserialization error to a line-numbered parse error
fn parse_error(file: &str, err: &csv::Error) -> DataLoadError {
    DataLoadError::Parse {
        file: file.to_string(),
        line: err.position().map_or(0, |pos| pos.line()),
        reason: err.to_string(),
    }
}

/// Publication year cells contain "0", blanks, and the occasional stray
/// string; none of those should fail the load
fn parse_year(s: &str) -> Option<u16> {
    match s.trim().parse::<u16>() {
        Ok(0) => None,
        Ok(year) => Some(year),
        Err(_) => None,
    }
}

/// Age cells contain "NULL" and blanks for a large share of users
fn parse_age(s: &str) -> Option<u8> {
    s.trim().parse::<u8>().ok()
}

// =============================================================================
// Per-file parse functions
// =============================================================================

fn parse_books_str(content: &str) -> Result<Vec<Book>> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut books = Vec::new();

    for record in reader.deserialize() {
        let raw: RawBook = record.map_err(|e| parse_error("books.csv", &e))?;
        books.push(Book {
            year: parse_year(&raw.year),
            isbn: raw.isbn,
            title: raw.title,
            author: raw.author,
            publisher: raw.publisher,
        });
    }
    Ok(books)
}

fn parse_ratings_str(content: &str) -> Result<Vec<Rating>> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut ratings = Vec::new();

    for record in reader.deserialize() {
        let raw: RawRating = record.map_err(|e| parse_error("ratings.csv", &e))?;
        ratings.push(Rating {
            user_id: raw.user_id,
            isbn: raw.isbn,
            rating: raw.rating,
        });
    }
    Ok(ratings)
}

fn parse_users_str(content: &str) -> Result<Vec<User>> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut users = Vec::new();

    for record in reader.deserialize() {
        let raw: RawUser = record.map_err(|e| parse_error("users.csv", &e))?;
        users.push(User {
            id: raw.id,
            location: raw.location,
            age: parse_age(&raw.age),
        });
    }
    Ok(users)
}

/// Parse the books.csv file
pub fn parse_books(path: &Path) -> Result<Vec<Book>> {
    parse_books_str(&read_to_string_latin1(path)?)
}

/// Parse the ratings.csv file
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    parse_ratings_str(&read_to_string_latin1(path)?)
}

/// Parse the users.csv file
pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    parse_users_str(&read_to_string_latin1(path)?)
}

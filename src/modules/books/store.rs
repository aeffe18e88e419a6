//! In-memory book collection.
//!
//! Every read-modify-write (id assignment + append, lookup + replace,
//! lookup + remove) runs under a single write lock, so two concurrent
//! creates can never be handed the same id.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use super::models::{coerce_id, seed_books, Book, BookError, BookPayload};

#[derive(Debug, Default)]
pub struct BookStore {
    books: RwLock<Vec<Book>>,
}

impl BookStore {
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books: RwLock::new(books),
        }
    }

    /// A store holding the default catalogue.
    pub fn seeded() -> Self {
        Self::new(seed_books())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Book>>, BookError> {
        self.books.read().map_err(|_| BookError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Book>>, BookError> {
        self.books.write().map_err(|_| BookError::LockPoisoned)
    }

    /// Snapshot of the whole collection in insertion order.
    pub fn find_all(&self) -> Result<Vec<Book>, BookError> {
        Ok(self.read()?.clone())
    }

    /// Look a book up by its raw id. A non-numeric id finds nothing.
    pub fn find_one(&self, id: &str) -> Result<Option<Book>, BookError> {
        let Some(id) = coerce_id(id) else {
            return Ok(None);
        };
        Ok(self.read()?.iter().find(|book| book.matches(id)).cloned())
    }

    /// Append a new book with id `max(existing) + 1`, or `1` when empty. A
    /// blank title is the only way this can be rejected.
    pub fn create(&self, payload: &BookPayload) -> Result<Book, BookError> {
        let title = payload.title().ok_or(BookError::TitleRequired)?;
        let author = payload.author().unwrap_or_default();
        let year = payload.year().unwrap_or(Value::Null);

        let mut books = self.write()?;
        let id = books.iter().map(|book| book.id).max().map_or(1, |max| max + 1);

        let book = Book {
            id,
            title: title.to_string(),
            author,
            year,
        };
        books.push(book.clone());

        tracing::debug!(book_id = id, total = books.len(), "book appended");
        Ok(book)
    }

    /// Replace a book's title, and its author/year when the payload names
    /// them. `Ok(false)` when no book has that id.
    pub fn update(&self, id: &str, payload: &BookPayload) -> Result<bool, BookError> {
        let id = coerce_id(id).ok_or(BookError::InvalidId)?;
        let title = payload.title().ok_or(BookError::MissingTitle)?;
        let author = payload.author();
        let year = payload.year();

        let mut books = self.write()?;
        let Some(book) = books.iter_mut().find(|book| book.matches(id)) else {
            return Ok(false);
        };

        book.title = title.to_string();
        if let Some(author) = author {
            book.author = author;
        }
        if let Some(year) = year {
            book.year = year;
        }
        Ok(true)
    }

    /// Remove the first book with this id. A non-numeric id removes nothing.
    pub fn remove(&self, id: &str) -> Result<bool, BookError> {
        let Some(id) = coerce_id(id) else {
            return Ok(false);
        };

        let mut books = self.write()?;
        match books.iter().position(|book| book.matches(id)) {
            Some(index) => {
                books.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

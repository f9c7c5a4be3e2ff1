use crate::types::Book;

/// The sample collection the query tasks are written against.
pub fn sample_books() -> Vec<Book> {
    vec![
        Book::new("To Kill a Mockingbird", "Harper Lee", "Fiction", 1960, 12.99, 336, true)
            .with_publisher("J. B. Lippincott & Co."),
        Book::new("1984", "George Orwell", "Dystopian", 1949, 10.99, 328, true)
            .with_publisher("Secker & Warburg"),
        Book::new("The Great Gatsby", "F. Scott Fitzgerald", "Fiction", 1925, 9.99, 180, true)
            .with_publisher("Charles Scribner's Sons"),
        Book::new("Brave New World", "Aldous Huxley", "Dystopian", 1932, 11.5, 311, false)
            .with_publisher("Chatto & Windus"),
        Book::new("The Hobbit", "J.R.R. Tolkien", "Fantasy", 1937, 14.99, 310, true)
            .with_publisher("George Allen & Unwin"),
        Book::new("The Catcher in the Rye", "J.D. Salinger", "Fiction", 1951, 8.99, 224, true)
            .with_publisher("Little, Brown and Company"),
        Book::new("Pride and Prejudice", "Jane Austen", "Romance", 1813, 7.99, 432, true)
            .with_publisher("T. Egerton"),
        Book::new("The Lord of the Rings", "J.R.R. Tolkien", "Fantasy", 1954, 19.99, 1178, true)
            .with_publisher("Allen & Unwin"),
        Book::new("Animal Farm", "George Orwell", "Political Satire", 1945, 8.5, 112, false)
            .with_publisher("Secker & Warburg"),
        Book::new("The Alchemist", "Paulo Coelho", "Fiction", 1988, 10.99, 197, true)
            .with_publisher("HarperOne"),
        Book::new("Moby Dick", "Herman Melville", "Adventure", 1851, 12.5, 635, false)
            .with_publisher("Harper & Brothers"),
        Book::new("Wuthering Heights", "Emily Brontë", "Gothic Fiction", 1847, 9.99, 342, true)
            .with_publisher("Thomas Cautley Newby"),
    ]
}

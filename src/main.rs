use std::env;
use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use exhash::{Directory, Record};

const BUCKET_CAPACITY: usize = 3;
const DEMO_PRODUCT_ID: u64 = 505;
const DEFAULT_INPUT: &str = "data/demo_input.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "ProductID")]
    pub product_id: u64,
    #[serde(rename = "ProductName")]
    pub product_name: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
}

impl Record for Product {
    fn key(&self) -> u64 {
        self.product_id
    }
}

/// The record file is rejected as a whole before anything reaches the
/// index, so a malformed entry cannot leave a half-loaded directory behind.
#[derive(Debug, Error)]
enum LoadError {
    #[error("Unable to read the record file: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

fn load_products(path: &Path) -> Result<Vec<Product>, LoadError> {
    let file = File::open(path)?;
    let products = serde_json::from_reader(BufReader::new(file))?;
    Ok(products)
}

fn main() {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| String::from(DEFAULT_INPUT));
    let products = match load_products(Path::new(&path)) {
        Ok(products) => products,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    let mut directory: Directory<Product> = Directory::new(BUCKET_CAPACITY);
    for product in products {
        if let Err(err) = directory.insert(product) {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
    println!("Loaded {} products from {}", directory.len(), path);
    println!("Load Factor: {:.2}", directory.load_factor());

    match directory.lookup(DEMO_PRODUCT_ID) {
        Some(product) => println!("Search Result: {:?}", product),
        None => println!("Search Result: no product with ProductID {}", DEMO_PRODUCT_ID),
    }
    println!("{}", directory);

    if let Err(err) = interact(&mut directory) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

/**
Prompt loop over stdin: look a product up by id, then offer the update /
delete / exit menu for it. A blank id (or closed stdin) ends the session.
*/
fn interact(directory: &mut Directory<Product>) -> io::Result<()> {
    let mut lines = io::stdin().lock().lines();
    loop {
        let input = match prompt(&mut lines, "\nProductID to inspect (blank to quit): ")? {
            Some(input) => input,
            None => break,
        };
        if input.is_empty() {
            break;
        }
        let product_id: u64 = match input.trim().parse() {
            Ok(id) => id,
            Err(_) => {
                println!("Invalid ProductID. Please enter a number.");
                continue;
            }
        };
        match directory.lookup(product_id) {
            Some(product) => println!("Product found: {:?}", product),
            None => {
                println!("Product not found.");
                continue;
            }
        }
        loop {
            println!("\nOptions:");
            println!("1. Update Product");
            println!("2. Delete Product");
            println!("3. Exit Menu");
            let choice = match prompt(&mut lines, "Enter your choice (1/2/3): ")? {
                Some(choice) => choice,
                None => return Ok(()),
            };
            match choice.trim() {
                "1" => {
                    update_product(directory, product_id, &mut lines)?;
                    break;
                }
                "2" => {
                    match directory.remove(product_id) {
                        Some(product) => println!(
                            "Product with ProductID {} deleted successfully.",
                            product.product_id
                        ),
                        None => println!("Product not found."),
                    }
                    break;
                }
                "3" => {
                    println!("Exiting menu.");
                    break;
                }
                _ => println!("Invalid choice. Please try again."),
            }
        }
    }
    Ok(())
}

/**
Field-by-field update of one product. Blank input keeps the existing value;
a quantity that does not parse keeps the existing value and says so. The
key field is never touched here, records stay where they hash to.
*/
fn update_product(
    directory: &mut Directory<Product>,
    product_id: u64,
    lines: &mut io::Lines<io::StdinLock<'static>>,
) -> io::Result<()> {
    let product = match directory.lookup_mut(product_id) {
        Some(product) => product,
        None => {
            println!("Product not found.");
            return Ok(());
        }
    };
    println!("Enter new details for the product (leave blank to keep existing value):");

    if let Some(name) = prompt(lines, &format!("Product Name [{}]: ", product.product_name))? {
        if !name.is_empty() {
            product.product_name = name;
        }
    }
    if let Some(category) = prompt(lines, &format!("Category [{}]: ", product.category))? {
        if !category.is_empty() {
            product.category = category;
        }
    }
    if let Some(quantity) = prompt(lines, &format!("Quantity [{}]: ", product.quantity))? {
        if !quantity.is_empty() {
            match quantity.trim().parse() {
                Ok(quantity) => product.quantity = quantity,
                Err(_) => println!("Invalid quantity. Keeping existing value."),
            }
        }
    }
    println!("Product updated successfully: {:?}", product);
    Ok(())
}

fn prompt(
    lines: &mut io::Lines<io::StdinLock<'static>>,
    label: &str,
) -> io::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line?.trim_end().to_string())),
        None => Ok(None),
    }
}

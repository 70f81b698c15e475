use super::Product;

const SIZES: [&str; 5] = ["S", "M", "L", "XL", "XXL"];

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    name: &str,
    regular_price: u32,
    sale_price: u32,
    image: &str,
    category: &str,
    description: &str,
    stock_count: u32,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        regular_price,
        sale_price: Some(sale_price),
        on_sale: true,
        image: image.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        in_stock: true,
        stock_count,
        available_sizes: SIZES.iter().map(|s| s.to_string()).collect(),
    }
}

/// The built-in storefront line-up.
pub fn default_products() -> Vec<Product> {
    vec![
        product(
            "bumable-brief-cheery-red",
            "Bumable Brief – Cheery Red",
            499,
            199,
            "../images/hero-product-1.jpg",
            "briefs",
            "Classic Bumable brief in cheery red",
            50,
        ),
        product(
            "bumable-brief-olive",
            "Bumable Brief – Olive",
            499,
            199,
            "../images/hero-product-2.jpg",
            "briefs",
            "Classic Bumable brief in olive",
            45,
        ),
        product(
            "bumable-brief-lt-grey",
            "Bumable Brief – Lt Grey",
            499,
            199,
            "../images/hero-product-1.jpg",
            "briefs",
            "Classic Bumable brief in light grey",
            55,
        ),
        product(
            "bumable-brief-navy",
            "Bumable Brief – Navy",
            499,
            199,
            "../images/hero-product-2.jpg",
            "briefs",
            "Classic Bumable brief in navy",
            40,
        ),
        product(
            "bumable-brief-black",
            "Bumable Brief – Black",
            499,
            199,
            "../images/hero-product-1.jpg",
            "briefs",
            "Classic Bumable brief in black",
            60,
        ),
        product(
            "tie-and-dye-brief",
            "Tie and Dye Brief",
            599,
            249,
            "../images/products/tie-dye/tie-dye-1-main.jpg",
            "tie-dye",
            "Vibrant tie-dye brief with unique patterns",
            30,
        ),
        product(
            "tie-and-dye-trunks",
            "Tie and Dye Trunks",
            599,
            249,
            "../images/products/tie-dye/tie-dye-2-main.jpg",
            "tie-dye",
            "Colorful tie-dye trunks with artistic designs",
            25,
        ),
        product(
            "solid-trunks-frozen-navy",
            "Solid Trunks – Frozen Navy",
            499,
            199,
            "../images/products/solid/solid-navy-main.jpg",
            "trunks",
            "Solid navy trunks",
            35,
        ),
        product(
            "solid-trunks-frozen-grey",
            "Solid Trunks – Frozen Grey",
            499,
            199,
            "../images/products/solid/solid-2-main.jpg",
            "trunks",
            "Solid grey trunks",
            42,
        ),
        product(
            "solid-trunks-frozen-black",
            "Solid Trunks – Frozen Black",
            499,
            199,
            "../images/products/solid/solid-3-main.jpg",
            "trunks",
            "Solid black trunks",
            38,
        ),
        product(
            "solid-trunks-frozen-green",
            "Solid Trunks – Frozen Green",
            499,
            199,
            "../images/products/solid/solid-4-main.jpg",
            "trunks",
            "Solid green trunks",
            33,
        ),
        product(
            "solid-trunks-frozen-burgundy",
            "Solid Trunks – Frozen Burgundy",
            499,
            199,
            "../images/products/solid/solid-5-main.jpg",
            "trunks",
            "Solid burgundy trunks",
            29,
        ),
    ]
}

use handlebars::Handlebars;
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

pub fn build_handlebars() -> Hbs {
    let mut hb = Handlebars::new();

    // Layout + pages
    hb.register_template_file("layouts/base", "templates/layouts/base.hbs")
        .expect("template layouts/base");

    hb.register_template_file("pages/home", "templates/pages/home.hbs")
        .expect("template pages/home");
    hb.register_template_file("pages/not_found", "templates/pages/not_found.hbs")
        .expect("template pages/not_found");
    hb.register_template_file("pages/login", "templates/pages/login.hbs")
        .expect("template pages/login");
    hb.register_template_file("pages/register", "templates/pages/register.hbs")
        .expect("template pages/register");
    hb.register_template_file("pages/products", "templates/pages/products.hbs")
        .expect("template pages/products");
    hb.register_template_file("pages/details", "templates/pages/details.hbs")
        .expect("template pages/details");
    hb.register_template_file("pages/alerts", "templates/pages/alerts.hbs")
        .expect("template pages/alerts");
    hb.register_template_file("pages/favorites", "templates/pages/favorites.hbs")
        .expect("template pages/favorites");
    hb.register_template_file("pages/settings", "templates/pages/settings.hbs")
        .expect("template pages/settings");

    // Partial endpoints
    hb.register_template_file("partials/product_list", "templates/partials/product_list.hbs")
        .expect("template partials/product_list");
    hb.register_template_file("partials/price_history", "templates/partials/price_history.hbs")
        .expect("template partials/price_history");
    hb.register_template_file("partials/alerts_list", "templates/partials/alerts_list.hbs")
        .expect("template partials/alerts_list");
    hb.register_template_file("partials/favorites_list", "templates/partials/favorites_list.hbs")
        .expect("template partials/favorites_list");
    hb.register_template_file("partials/change_email", "templates/partials/change_email.hbs")
        .expect("template partials/change_email");
    hb.register_template_file("partials/change_password", "templates/partials/change_password.hbs")
        .expect("template partials/change_password");

    let navbar = std::fs::read_to_string("templates/partials/navbar.hbs")
        .expect("partials/navbar.hbs");
    hb.register_partial("navbar", navbar).expect("register navbar partial");

    let footer = std::fs::read_to_string("templates/partials/footer.hbs")
        .expect("partials/footer.hbs");
    hb.register_partial("footer", footer).expect("register footer partial");

    Arc::new(hb)
}

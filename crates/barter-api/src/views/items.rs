use std::fmt::Write;

use barter_db::models::ListedItem;
use barter_types::categories::ITEM_CATEGORIES;
use barter_types::models::{Item, Session};

use super::{category_checkboxes, category_options, error_list, escape, layout};

/// What the user typed into an item form, echoed back on validation errors.
#[derive(Debug, Clone, Default)]
pub struct ItemFormValues {
    pub title: String,
    pub description: String,
    pub item_type: String,
    pub wanted: Vec<String>,
}

impl From<&Item> for ItemFormValues {
    fn from(item: &Item) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            item_type: item.category.clone().unwrap_or_default(),
            wanted: item.wanted_categories.clone(),
        }
    }
}

/// The shared title/description/category/image inputs.
pub fn item_fields(values: &ItemFormValues, with_wanted: bool) -> String {
    let wanted = if with_wanted {
        format!(
            r#"<fieldset>
      <legend>Looking for</legend>
      {}
    </fieldset>"#,
            category_checkboxes("wantedCategories", &values.wanted)
        )
    } else {
        String::new()
    };

    let item_type = (!values.item_type.is_empty()).then_some(values.item_type.as_str());

    format!(
        r#"<label>Title <input type="text" name="title" value="{title}"></label>
    <label>Description <textarea name="description" rows="4">{description}</textarea></label>
    <label>Category
      <select name="itemType">
        <option value="">Choose a category</option>
        {options}
      </select>
    </label>
    {wanted}
    <label>Image <input type="file" name="image" accept="image/*"></label>"#,
        title = escape(&values.title),
        description = escape(&values.description),
        options = category_options(item_type),
        wanted = wanted,
    )
}

pub fn new_item_page(session: Option<&Session>, values: &ItemFormValues, errors: &[String]) -> String {
    let body = format!(
        r#"<section>
  <h1>Post Item</h1>
  {errors}
  <form method="post" action="/items/new" enctype="multipart/form-data">
    {fields}
    <button type="submit">Post item</button>
  </form>
</section>"#,
        errors = error_list(errors),
        fields = item_fields(values, true),
    );
    layout("Post Item", session, &body)
}

pub fn edit_item_page(
    session: Option<&Session>,
    item: &Item,
    values: &ItemFormValues,
    errors: &[String],
) -> String {
    let current = item
        .display_image_url()
        .map(|url| {
            format!(
                r#"<figure class="current-image"><img src="{}" alt="Current image"><figcaption>Upload a new image to replace it.</figcaption></figure>"#,
                escape(&url)
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"<section>
  <h1>Edit Item</h1>
  {errors}
  {current}
  <form method="post" action="/items/{id}/edit" enctype="multipart/form-data">
    {fields}
    <button type="submit">Save changes</button>
  </form>
  <form method="post" action="/items/{id}/delete" class="danger">
    <button type="submit">Delete item</button>
  </form>
</section>"#,
        errors = error_list(errors),
        current = current,
        id = escape(&item.item_id),
        fields = item_fields(values, true),
    );
    layout("Edit Item", session, &body)
}

/// Compact item summary used by search, account and swap pages.
pub fn item_card(item: &Item, owner_name: Option<&str>, actions: &str) -> String {
    let image = item
        .display_image_url()
        .map(|url| format!(r#"<img src="{}" alt="{}">"#, escape(&url), escape(&item.title)))
        .unwrap_or_else(|| r#"<div class="no-image">No image</div>"#.to_string());

    let category = item
        .category
        .as_deref()
        .map(|c| format!(r#"<span class="tag">{}</span>"#, escape(c)))
        .unwrap_or_default();

    let wanted = if item.wanted_categories.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p class="wanted">Wants: {}</p>"#,
            escape(&item.wanted_categories.join(", "))
        )
    };

    let owner = owner_name
        .map(|o| format!(r#"<p class="owner">Posted by {}</p>"#, escape(o)))
        .unwrap_or_default();

    let status = if item.is_swapped() {
        r#"<span class="badge swapped">Swapped</span>"#
    } else {
        ""
    };

    format!(
        r#"<article class="item-card">
  {image}
  <h3>{title} {status}</h3>
  {category}
  <p>{description}</p>
  {wanted}
  {owner}
  <div class="actions">{actions}</div>
</article>"#,
        image = image,
        title = escape(&item.title),
        status = status,
        category = category,
        description = escape(&item.description),
        wanted = wanted,
        owner = owner,
        actions = actions,
    )
}

/// Normalized search parameters, echoed into the form.
#[derive(Debug, Clone, Default)]
pub struct SearchView {
    pub q: String,
    pub offer: String,
    pub want: String,
    pub include_swapped: bool,
}

pub fn search_page(session: &Session, query: &SearchView, results: &[ListedItem]) -> String {
    let select = |name: &str, current: &str, blank: &str| {
        let mut out = format!(r#"<select name="{}"><option value="">{}</option>"#, name, blank);
        for cat in ITEM_CATEGORIES {
            let sel = if cat.eq_ignore_ascii_case(current) { " selected" } else { "" };
            let _ = write!(out, r#"<option value="{0}"{1}>{0}</option>"#, cat, sel);
        }
        out.push_str("</select>");
        out
    };

    let mut cards = String::new();
    for listed in results {
        let item = &listed.item;
        let actions = if item.owner_id == session.user.user_id {
            format!(r#"<a href="/items/{}/edit">Edit</a>"#, escape(&item.item_id))
        } else if item.is_swapped() {
            String::new()
        } else {
            format!(r#"<a class="button" href="/swaps/{}">Request swap</a>"#, escape(&item.item_id))
        };
        cards.push_str(&item_card(item, Some(&listed.owner_name), &actions));
    }
    if results.is_empty() {
        cards.push_str(r#"<p class="empty">No items match your search.</p>"#);
    }

    let plural = if results.len() == 1 { "" } else { "s" };
    let body = format!(
        r#"<section>
  <h1>Search Items</h1>
  <form method="get" action="/search" class="search">
    <input type="search" name="q" value="{q}" placeholder="Search titles and descriptions">
    {offer}
    {want}
    <label class="check"><input type="checkbox" name="includeSwapped" value="true"{swapped}> Include swapped</label>
    <button type="submit">Search</button>
  </form>
  <p class="count">{count} item{plural} found</p>
  <div class="grid">
    {cards}
  </div>
</section>"#,
        q = escape(&query.q),
        offer = select("offer", &query.offer, "Any offered category"),
        want = select("want", &query.want, "Any wanted category"),
        swapped = if query.include_swapped { " checked" } else { "" },
        count = results.len(),
        plural = plural,
        cards = cards,
    );
    layout("Search Items", Some(session), &body)
}

//! Built-in component bodies for well-known section names.

use pagesmith_lifecycle::ComponentName;

const HERO: &str = r##"<section id="{id}-section" class="py-24 bg-white dark:bg-slate-900">
  <div class="max-w-5xl mx-auto px-6 text-center">
    <h1 class="text-5xl font-bold text-slate-900 dark:text-white">Welcome</h1>
    <p class="mt-6 text-lg text-slate-600 dark:text-slate-300">A short sentence about what you do and who it is for.</p>
    <a href="#contact" class="mt-8 inline-block rounded-lg px-6 py-3 bg-indigo-600 text-white">Get started</a>
  </div>
</section>"##;

const FEATURES: &str = r##"<section id="{id}-section" class="py-20">
  <div class="max-w-6xl mx-auto px-6">
    <h2 class="text-3xl font-bold text-center">{title}</h2>
    <div class="mt-12 grid gap-8 md:grid-cols-3">
      <div class="p-6 rounded-xl border">
        <h3 class="text-xl font-semibold">Fast</h3>
        <p class="mt-2 text-slate-600">Explain the first benefit in a sentence.</p>
      </div>
      <div class="p-6 rounded-xl border">
        <h3 class="text-xl font-semibold">Reliable</h3>
        <p class="mt-2 text-slate-600">Explain the second benefit in a sentence.</p>
      </div>
      <div class="p-6 rounded-xl border">
        <h3 class="text-xl font-semibold">Friendly</h3>
        <p class="mt-2 text-slate-600">Explain the third benefit in a sentence.</p>
      </div>
    </div>
  </div>
</section>"##;

const FAQ: &str = r##"<section id="{id}-section" class="py-20">
  <div class="max-w-3xl mx-auto px-6">
    <h2 class="text-3xl font-bold">Frequently asked questions</h2>
    <div class="mt-8 space-y-4">
      <details class="rounded-lg border p-4">
        <summary class="font-semibold">How do I get started?</summary>
        <p class="mt-2 text-slate-600">Reach out through the contact form and we will reply within a day.</p>
      </details>
      <details class="rounded-lg border p-4">
        <summary class="font-semibold">What does it cost?</summary>
        <p class="mt-2 text-slate-600">See the pricing section for current plans.</p>
      </details>
    </div>
  </div>
</section>"##;

const PRICING: &str = r##"<section id="{id}-section" class="py-20 bg-slate-50">
  <div class="max-w-6xl mx-auto px-6">
    <h2 class="text-3xl font-bold text-center">Pricing</h2>
    <div class="mt-12 grid gap-8 md:grid-cols-3">
      <div class="p-8 rounded-xl bg-white shadow">
        <h3 class="text-xl font-semibold">Starter</h3>
        <p class="mt-4 text-4xl font-bold">$9</p>
      </div>
      <div class="p-8 rounded-xl bg-white shadow">
        <h3 class="text-xl font-semibold">Pro</h3>
        <p class="mt-4 text-4xl font-bold">$29</p>
      </div>
      <div class="p-8 rounded-xl bg-white shadow">
        <h3 class="text-xl font-semibold">Team</h3>
        <p class="mt-4 text-4xl font-bold">$99</p>
      </div>
    </div>
  </div>
</section>"##;

const TESTIMONIALS: &str = r##"<section id="{id}-section" class="py-20">
  <div class="max-w-5xl mx-auto px-6">
    <h2 class="text-3xl font-bold text-center">What people say</h2>
    <div class="mt-12 grid gap-8 md:grid-cols-2">
      <blockquote class="p-6 rounded-xl border">
        <p class="text-slate-700">"Exactly what we needed."</p>
        <cite class="mt-4 block text-sm text-slate-500">Alex, customer</cite>
      </blockquote>
      <blockquote class="p-6 rounded-xl border">
        <p class="text-slate-700">"Friendly and fast."</p>
        <cite class="mt-4 block text-sm text-slate-500">Sam, customer</cite>
      </blockquote>
    </div>
  </div>
</section>"##;

const CONTACT: &str = r##"<section id="{id}-section" class="py-20">
  <div class="max-w-xl mx-auto px-6">
    <h2 class="text-3xl font-bold">Get in touch</h2>
    <form class="mt-8 space-y-4">
      <input type="text" name="name" placeholder="Your name" class="w-full rounded border p-3" />
      <input type="email" name="email" placeholder="Email" class="w-full rounded border p-3" />
      <textarea name="message" rows="4" placeholder="Message" class="w-full rounded border p-3"></textarea>
      <button type="submit" class="rounded-lg px-6 py-3 bg-indigo-600 text-white">Send</button>
    </form>
  </div>
</section>"##;

const FOOTER: &str = r##"<footer id="{id}-section" class="py-10 border-t">
  <div class="max-w-6xl mx-auto px-6 flex justify-between text-sm text-slate-500">
    <p>&copy; Your Company</p>
    <nav class="flex gap-6">
      <a href="#">Privacy</a>
      <a href="#">Terms</a>
    </nav>
  </div>
</footer>"##;

const LIST: &str = r##"<section id="{id}-section" class="py-20">
  <div class="max-w-6xl mx-auto px-6">
    <h2 class="text-3xl font-bold text-center">{title}</h2>
    <ul class="mt-12 grid gap-6 md:grid-cols-3">
      <li class="p-6 rounded-xl border">
        <h3 class="text-xl font-semibold">First item</h3>
        <p class="mt-2 text-slate-600">A short description.</p>
      </li>
      <li class="p-6 rounded-xl border">
        <h3 class="text-xl font-semibold">Second item</h3>
        <p class="mt-2 text-slate-600">A short description.</p>
      </li>
      <li class="p-6 rounded-xl border">
        <h3 class="text-xl font-semibold">Third item</h3>
        <p class="mt-2 text-slate-600">A short description.</p>
      </li>
    </ul>
  </div>
</section>"##;

const GENERIC: &str = r##"<section id="{id}-section" class="py-20">
  <div class="max-w-5xl mx-auto px-6">
    <h2 class="text-3xl font-bold">{title}</h2>
    <p class="mt-4 text-slate-600">Add your content here.</p>
  </div>
</section>"##;

/// Template for a well-known section name.
pub fn template_for(name: &ComponentName) -> Option<String> {
    let template = match name.id() {
        "hero" | "banner" => HERO,
        "features" | "benefits" => FEATURES,
        "faq" | "faqs" | "questions" => FAQ,
        "pricing" | "plans" => PRICING,
        "testimonials" | "reviews" => TESTIMONIALS,
        "contact" | "contactus" => CONTACT,
        "footer" => FOOTER,
        "menu" | "services" | "classes" | "products" | "courses" | "team" | "gallery"
        | "listings" | "rooms" => LIST,
        _ => return None,
    };
    Some(render(template, name))
}

/// Placeholder body for any name. Creation never fails for lack of content.
pub fn generic_template(name: &ComponentName) -> String {
    render(GENERIC, name)
}

fn render(template: &str, name: &ComponentName) -> String {
    template
        .replace("{id}", name.id())
        .replace("{title}", &display_title(name.as_str()))
}

/// `PricingTable` → `Pricing Table`.
fn display_title(name: &str) -> String {
    let mut title = String::with_capacity(name.len() + 4);
    for (idx, c) in name.char_indices() {
        if idx > 0 && c.is_uppercase() {
            title.push(' ');
        }
        title.push(c);
    }
    title
}
